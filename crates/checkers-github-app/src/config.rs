// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Configuration for the GitHub App client.

use std::time::Duration;

use checkers_common_secret::SecretString;
use reqwest::Url;

use crate::error::GithubAppError;

pub const DEFAULT_BASE_URL: &str = "https://api.github.com";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the GitHub App client.
///
/// The private key and webhook secret are [`SecretString`]s and print as
/// `[REDACTED]`.
#[derive(Clone)]
pub struct GithubAppConfig {
	/// GitHub App numeric ID
	app_id: u64,

	/// PEM-encoded RSA private key for JWT signing
	private_key_pem: SecretString,

	/// Secret for webhook signature verification
	webhook_secret: Option<SecretString>,

	/// Base URL for GitHub API (validated HTTPS, parsed)
	base_url: Url,

	/// Timeout applied to every outbound request
	request_timeout: Duration,
}

impl std::fmt::Debug for GithubAppConfig {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("GithubAppConfig")
			.field("app_id", &self.app_id)
			.field("private_key_pem", &self.private_key_pem)
			.field("webhook_secret", &self.webhook_secret)
			.field("base_url", &self.base_url.as_str())
			.field("request_timeout", &self.request_timeout)
			.finish()
	}
}

impl GithubAppConfig {
	/// Parse and check a base URL: HTTPS only, with a non-loopback host.
	pub fn validate_base_url(raw: &str) -> Result<Url, GithubAppError> {
		let url = Url::parse(raw)
			.map_err(|e| GithubAppError::Config(format!("Invalid GitHub base URL '{raw}': {e}")))?;

		if url.scheme() != "https" {
			return Err(GithubAppError::Config(format!(
				"GitHub base URL must use https, got '{}'",
				url.scheme()
			)));
		}

		let host = url
			.host_str()
			.ok_or_else(|| GithubAppError::Config("GitHub base URL must include a host".to_string()))?;

		if host == "localhost" || host == "127.0.0.1" || host == "[::1]" {
			return Err(GithubAppError::Config(
				"GitHub base URL must not be localhost".to_string(),
			));
		}

		Ok(url)
	}

	/// Create a configuration against api.github.com.
	pub fn new(app_id: u64, private_key_pem: SecretString) -> Self {
		Self {
			app_id,
			private_key_pem,
			webhook_secret: None,
			base_url: Url::parse(DEFAULT_BASE_URL).expect("default URL is valid"),
			request_timeout: DEFAULT_REQUEST_TIMEOUT,
		}
	}

	/// Point the client at GitHub Enterprise (e.g. `https://ghe.example.com/api/v3`).
	pub fn with_base_url(mut self, url: &str) -> Result<Self, GithubAppError> {
		self.base_url = Self::validate_base_url(url)?;
		Ok(self)
	}

	/// Skips base URL validation so tests can target a local mock server.
	#[cfg(test)]
	pub(crate) fn with_unchecked_base_url(mut self, url: Url) -> Self {
		self.base_url = url;
		self
	}

	pub fn with_webhook_secret(mut self, secret: SecretString) -> Self {
		self.webhook_secret = Some(secret);
		self
	}

	pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
		self.request_timeout = timeout;
		self
	}

	pub fn app_id(&self) -> u64 {
		self.app_id
	}

	pub(crate) fn private_key_pem(&self) -> &str {
		self.private_key_pem.expose()
	}

	pub fn webhook_secret(&self) -> Option<&SecretString> {
		self.webhook_secret.as_ref()
	}

	pub fn base_url(&self) -> &Url {
		&self.base_url
	}

	pub fn request_timeout(&self) -> Duration {
		self.request_timeout
	}
}
