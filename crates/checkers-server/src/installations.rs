// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Organization login to installation id, loaded from GitHub on demand.

use std::collections::HashMap;
use std::sync::Arc;

use checkers_github_app::{GithubApi, GithubAppError};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

/// Organization login (case-sensitive) to installation id.
pub type InstallationMap = HashMap<String, u64>;

/// In-memory installation lookup.
///
/// The map is absent until the first successful load and is replaced
/// wholesale by every reload. Readers take an `Arc` snapshot, so they see
/// either the old map or the new one. Reloads are serialized; a non-forced
/// caller that waited behind one skips its own.
pub struct InstallationCache {
	api: Arc<dyn GithubApi>,
	map: RwLock<Option<Arc<InstallationMap>>>,
	reload_lock: Mutex<()>,
}

impl InstallationCache {
	pub fn new(api: Arc<dyn GithubApi>) -> Self {
		Self {
			api,
			map: RwLock::new(None),
			reload_lock: Mutex::new(()),
		}
	}

	/// Load the map unless it is already present, or always when `force`.
	///
	/// On failure the current map, if any, is kept.
	#[instrument(skip(self))]
	pub async fn ensure_loaded(&self, force: bool) -> Result<(), GithubAppError> {
		if !force && self.is_loaded().await {
			return Ok(());
		}

		let _guard = self.reload_lock.lock().await;

		if !force && self.is_loaded().await {
			debug!("installations loaded while waiting for reload");
			return Ok(());
		}

		let installations = self.api.list_installations().await.map_err(|e| {
			warn!(error = %e, "failed to list installations");
			e
		})?;

		let map: InstallationMap = installations
			.into_iter()
			.filter_map(|installation| match installation.login() {
				Some(login) => Some((login.to_string(), installation.id)),
				None => {
					debug!(
						installation_id = installation.id,
						"skipping installation without account login"
					);
					None
				}
			})
			.collect();

		info!(installations = map.len(), forced = force, "installation map reloaded");
		*self.map.write().await = Some(Arc::new(map));
		Ok(())
	}

	/// Reload the map, e.g. after an installation was added or removed.
	pub async fn invalidate(&self) -> Result<(), GithubAppError> {
		self.ensure_loaded(true).await
	}

	/// The current map, or `None` before the first load.
	pub async fn snapshot(&self) -> Option<Arc<InstallationMap>> {
		self.map.read().await.clone()
	}

	pub async fn is_loaded(&self) -> bool {
		self.map.read().await.is_some()
	}

	/// Installation id for `org`, if the map is loaded and contains it.
	pub async fn lookup(&self, org: &str) -> Option<u64> {
		self
			.map
			.read()
			.await
			.as_ref()
			.and_then(|map| map.get(org).copied())
	}
}
