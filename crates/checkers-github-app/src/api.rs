// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! The GitHub capability the gateway is written against.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use checkers_common_secret::SecretString;

use crate::error::GithubAppError;
use crate::types::{CommitComment, CreateCheckRun, Installation, UpdateCheckRun, UpstreamResponse};

/// An installation-scoped access token, issued for a single request.
#[derive(Debug, Clone)]
pub struct InstallationAuth {
	pub installation_id: u64,
	pub token: SecretString,
	pub expires_at: DateTime<Utc>,
}

/// Operations against GitHub on behalf of the App.
///
/// Each call is attempted once; callers decide how failures surface.
#[async_trait]
pub trait GithubApi: Send + Sync {
	/// Every installation of the App, across all pages.
	async fn list_installations(&self) -> Result<Vec<Installation>, GithubAppError>;

	/// Issue an access token scoped to one installation.
	async fn authorize(&self, installation_id: u64) -> Result<InstallationAuth, GithubAppError>;

	async fn create_check_run(
		&self,
		auth: &InstallationAuth,
		request: &CreateCheckRun,
	) -> Result<UpstreamResponse, GithubAppError>;

	async fn update_check_run(
		&self,
		auth: &InstallationAuth,
		request: &UpdateCheckRun,
	) -> Result<UpstreamResponse, GithubAppError>;

	async fn create_commit_comment(
		&self,
		auth: &InstallationAuth,
		comment: &CommitComment,
	) -> Result<(), GithubAppError>;
}
