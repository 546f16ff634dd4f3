// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Wire types for the GitHub REST API and App webhooks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A GitHub App installation, as returned by `GET /app/installations`.
///
/// Enterprise installations carry an account with `slug`/`name` and no
/// `login`, and `account` itself may be `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installation {
	pub id: u64,
	#[serde(default)]
	pub account: Option<InstallationAccount>,
}

impl Installation {
	/// The account login, when the installation belongs to a user or org.
	pub fn login(&self) -> Option<&str> {
		self.account.as_ref()?.login.as_deref()
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallationAccount {
	#[serde(default)]
	pub login: Option<String>,
	#[serde(default, rename = "type")]
	pub account_type: Option<String>,
}

/// `POST /app/installations/{id}/access_tokens` response.
#[derive(Debug, Deserialize)]
pub(crate) struct AccessTokenResponse {
	pub token: String,
	pub expires_at: DateTime<Utc>,
}

/// Error body GitHub returns on failed requests.
#[derive(Debug, Deserialize)]
pub(crate) struct GitHubErrorResponse {
	pub message: String,
}

/// Optional check-run fields a client may supply.
///
/// Values are forwarded to GitHub untouched, whatever their JSON type, and
/// GitHub does the validation. A missing key is left out of the outbound
/// request; a key sent as `null` is forwarded as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckRunFields {
	#[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
	pub details_url: Option<Value>,
	#[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
	pub external_id: Option<Value>,
	#[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
	pub status: Option<Value>,
	#[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
	pub started_at: Option<Value>,
	#[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
	pub conclusion: Option<Value>,
	#[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
	pub completed_at: Option<Value>,
	#[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
	pub output: Option<Value>,
}

/// Only called for keys that are present, so `null` becomes `Some(Value::Null)`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
	D: Deserializer<'de>,
{
	Value::deserialize(deserializer).map(Some)
}

/// A check run to create on `owner/repo` at `head_sha`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateCheckRun {
	pub owner: String,
	pub repo: String,
	pub name: String,
	pub head_sha: String,
	pub fields: CheckRunFields,
}

/// An update to check run `check_run_id` on `owner/repo`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateCheckRun {
	pub owner: String,
	pub repo: String,
	pub check_run_id: u64,
	pub fields: CheckRunFields,
}

#[derive(Debug, Serialize)]
pub(crate) struct CreateCheckRunBody<'a> {
	pub name: &'a str,
	pub head_sha: &'a str,
	#[serde(flatten)]
	pub fields: &'a CheckRunFields,
}

/// A comment to leave on a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitComment {
	pub owner: String,
	pub repo: String,
	pub commit_sha: String,
	pub body: String,
}

/// GitHub's status and JSON body, relayed to the client unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResponse {
	pub status: u16,
	pub body: serde_json::Value,
}

/// The parts of an `installation` webhook event we log.
#[derive(Debug, Clone, Deserialize)]
pub struct InstallationWebhookPayload {
	pub action: String,
	pub installation: Installation,
}

/// The parts of a `check_run` webhook event we act on.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckRunWebhookPayload {
	pub action: String,
	pub check_run: WebhookCheckRun,
	pub repository: WebhookRepository,
	#[serde(default)]
	pub installation: Option<WebhookInstallation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookInstallation {
	pub id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookCheckRun {
	pub id: u64,
	pub head_sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookRepository {
	pub name: String,
	pub owner: WebhookOwner,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookOwner {
	pub login: String,
}
