// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! GitHub App configuration section.

use checkers_common_secret::SecretString;
use checkers_github_app::GithubAppConfig;
use serde::Deserialize;

use crate::error::ConfigError;

/// Configuration layer for the GitHub App (all fields optional for layering).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GithubAppConfigLayer {
	/// GitHub App numeric ID.
	pub app_id: Option<u64>,
	/// PEM-encoded RSA private key for JWT signing.
	pub private_key_pem: Option<SecretString>,
	/// Secret for webhook signature verification.
	pub webhook_secret: Option<SecretString>,
	/// Base URL for the GitHub API.
	pub base_url: Option<String>,
}

impl GithubAppConfigLayer {
	/// Merge with another layer, preferring values from `other`.
	pub fn merge(&mut self, other: GithubAppConfigLayer) {
		if other.app_id.is_some() {
			self.app_id = other.app_id;
		}
		if other.private_key_pem.is_some() {
			self.private_key_pem = other.private_key_pem;
		}
		if other.webhook_secret.is_some() {
			self.webhook_secret = other.webhook_secret;
		}
		if other.base_url.is_some() {
			self.base_url = other.base_url;
		}
	}

	/// Build the client configuration. The App ID and private key are
	/// required; the server cannot do anything without them.
	pub fn build(self) -> Result<GithubAppConfig, ConfigError> {
		let app_id = self
			.app_id
			.ok_or_else(|| ConfigError::Missing("github_app.app_id".to_string()))?;

		let private_key_pem = self
			.private_key_pem
			.ok_or_else(|| ConfigError::Missing("github_app.private_key_pem".to_string()))?;

		if private_key_pem.expose().trim().is_empty() {
			return Err(ConfigError::Validation(
				"GitHub App private_key_pem cannot be empty".to_string(),
			));
		}

		let mut config = GithubAppConfig::new(app_id, private_key_pem);

		if let Some(url) = self.base_url {
			config = config
				.with_base_url(&url)
				.map_err(|e| ConfigError::InvalidValue {
					key: "github_app.base_url".to_string(),
					message: e.to_string(),
				})?;
		}

		if let Some(secret) = self.webhook_secret {
			config = config.with_webhook_secret(secret);
		}

		Ok(config)
	}
}
