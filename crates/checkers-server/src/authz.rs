// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Organization to installation-scoped authorization.

use std::sync::Arc;

use checkers_github_app::{GithubApi, GithubAppError, InstallationAuth};
use tracing::{debug, instrument};

use crate::error::ServerError;
use crate::installations::InstallationCache;

/// Resolves organizations against the [`InstallationCache`] and issues
/// installation tokens for the ones that have the App installed.
#[derive(Clone)]
pub struct InstallationResolver {
	cache: Arc<InstallationCache>,
	api: Arc<dyn GithubApi>,
}

impl InstallationResolver {
	pub fn new(cache: Arc<InstallationCache>, api: Arc<dyn GithubApi>) -> Self {
		Self { cache, api }
	}

	/// Installation id for `org`. Unknown and uninstalled organizations are
	/// indistinguishable to the caller.
	pub async fn resolve(&self, org: &str) -> Result<u64, ServerError> {
		self
			.cache
			.lookup(org)
			.await
			.ok_or_else(|| ServerError::NotInstalled {
				org: org.to_string(),
			})
	}

	/// Resolve `org` and issue a token for its installation. The token lives
	/// only as long as the returned value. Issuance failures are a 500.
	#[instrument(skip(self))]
	pub async fn authorize(&self, org: &str) -> Result<InstallationAuth, ServerError> {
		let installation_id = self.resolve(org).await?;
		self
			.authorize_installation(installation_id)
			.await
			.map_err(ServerError::upstream)
	}

	/// Issue a token for a known installation. The caller decides how a
	/// GitHub failure maps to a response.
	pub async fn authorize_installation(
		&self,
		installation_id: u64,
	) -> Result<InstallationAuth, GithubAppError> {
		let auth = self.api.authorize(installation_id).await?;
		debug!(installation_id, "issued installation token");
		Ok(auth)
	}
}
