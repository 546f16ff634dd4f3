// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use checkers_common_secret::SecretString;
use checkers_github_app::{
	CommitComment, CreateCheckRun, GithubApi, GithubAppError, Installation, InstallationAccount,
	InstallationAuth, UpdateCheckRun, UpstreamResponse,
};

/// In-process `GithubApi` for unit tests.
pub struct MockGithub {
	installations: Mutex<Vec<Installation>>,
	list_delay: Mutex<Duration>,
	fail_listing: AtomicBool,
	list_calls: AtomicUsize,
	authorize_calls: AtomicUsize,
	authorize_failure: Mutex<Option<GithubAppError>>,
}

impl MockGithub {
	pub fn with_installations(pairs: &[(&str, u64)]) -> Self {
		let mock = Self {
			installations: Mutex::new(Vec::new()),
			list_delay: Mutex::new(Duration::ZERO),
			fail_listing: AtomicBool::new(false),
			list_calls: AtomicUsize::new(0),
			authorize_calls: AtomicUsize::new(0),
			authorize_failure: Mutex::new(None),
		};
		mock.set_installations(pairs);
		mock
	}

	pub fn set_installations(&self, pairs: &[(&str, u64)]) {
		*self.installations.lock().unwrap() = pairs
			.iter()
			.map(|(login, id)| Installation {
				id: *id,
				account: Some(InstallationAccount {
					login: Some(login.to_string()),
					account_type: Some("Organization".to_string()),
				}),
			})
			.collect();
	}

	pub fn set_raw_installations(&self, installations: Vec<Installation>) {
		*self.installations.lock().unwrap() = installations;
	}

	pub fn set_list_delay(&self, delay: Duration) {
		*self.list_delay.lock().unwrap() = delay;
	}

	pub fn fail_listing(&self, fail: bool) {
		self.fail_listing.store(fail, Ordering::SeqCst);
	}

	pub fn list_calls(&self) -> usize {
		self.list_calls.load(Ordering::SeqCst)
	}

	pub fn fail_authorize(&self, err: GithubAppError) {
		*self.authorize_failure.lock().unwrap() = Some(err);
	}

	pub fn authorize_calls(&self) -> usize {
		self.authorize_calls.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl GithubApi for MockGithub {
	async fn list_installations(&self) -> Result<Vec<Installation>, GithubAppError> {
		self.list_calls.fetch_add(1, Ordering::SeqCst);
		let delay = *self.list_delay.lock().unwrap();
		if !delay.is_zero() {
			tokio::time::sleep(delay).await;
		}
		if self.fail_listing.load(Ordering::SeqCst) {
			return Err(GithubAppError::api_error(502, "Bad Gateway"));
		}
		Ok(self.installations.lock().unwrap().clone())
	}

	async fn authorize(&self, installation_id: u64) -> Result<InstallationAuth, GithubAppError> {
		self.authorize_calls.fetch_add(1, Ordering::SeqCst);
		if let Some(err) = self.authorize_failure.lock().unwrap().take() {
			return Err(err);
		}
		Ok(InstallationAuth {
			installation_id,
			token: SecretString::from(format!("ghs_{installation_id}")),
			expires_at: chrono::Utc::now(),
		})
	}

	async fn create_check_run(
		&self,
		_auth: &InstallationAuth,
		_request: &CreateCheckRun,
	) -> Result<UpstreamResponse, GithubAppError> {
		Ok(UpstreamResponse {
			status: 201,
			body: serde_json::json!({}),
		})
	}

	async fn update_check_run(
		&self,
		_auth: &InstallationAuth,
		_request: &UpdateCheckRun,
	) -> Result<UpstreamResponse, GithubAppError> {
		Ok(UpstreamResponse {
			status: 200,
			body: serde_json::json!({}),
		})
	}

	async fn create_commit_comment(
		&self,
		_auth: &InstallationAuth,
		_comment: &CommitComment,
	) -> Result<(), GithubAppError> {
		Ok(())
	}
}
