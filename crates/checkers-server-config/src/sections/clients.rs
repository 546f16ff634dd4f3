// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Registered API clients and how their requests are signed.

use std::collections::HashMap;

use checkers_common_secret::SecretString;
use checkers_common_signature::SigningScheme;
use serde::Deserialize;
use tracing::warn;

use crate::error::ConfigError;

/// Client key to shared secret. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct ClientRegistry {
	clients: HashMap<String, SecretString>,
}

impl ClientRegistry {
	/// Parse a `key:secret;key:secret` table.
	///
	/// Keys and secrets are taken byte for byte. Only line breaks around an
	/// entry are dropped, so a table may span lines. Blank entries are
	/// skipped. A secret may not contain `:`; such an entry is rejected
	/// rather than split one way or the other.
	pub fn parse(table: &str) -> Result<Self, ConfigError> {
		let mut clients = HashMap::new();

		for (index, entry) in table.split(';').enumerate() {
			let entry = entry.trim_matches(|c| c == '\r' || c == '\n');
			if entry.trim().is_empty() {
				continue;
			}

			let Some((key, secret)) = entry.split_once(':') else {
				return Err(invalid_entry(index, "expected 'key:secret'"));
			};

			if key.is_empty() {
				return Err(invalid_entry(index, "client key is empty"));
			}
			if secret.is_empty() {
				return Err(invalid_entry(index, "client secret is empty"));
			}
			if secret.contains(':') {
				return Err(invalid_entry(index, "client secret must not contain ':'"));
			}

			if clients
				.insert(key.to_string(), SecretString::from(secret))
				.is_some()
			{
				return Err(ConfigError::Validation(format!(
					"client key '{key}' is registered more than once"
				)));
			}
		}

		Ok(Self { clients })
	}

	pub fn secret(&self, key: &str) -> Option<&SecretString> {
		self.clients.get(key)
	}

	pub fn contains(&self, key: &str) -> bool {
		self.clients.contains_key(key)
	}

	pub fn len(&self) -> usize {
		self.clients.len()
	}

	pub fn is_empty(&self) -> bool {
		self.clients.is_empty()
	}
}

fn invalid_entry(index: usize, message: &str) -> ConfigError {
	ConfigError::InvalidValue {
		key: format!("clients.table[{index}]"),
		message: message.to_string(),
	}
}

/// Clients configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientsConfigLayer {
	/// `key:secret;...` table.
	#[serde(default)]
	pub table: Option<SecretString>,
	#[serde(default)]
	pub signing_scheme: Option<String>,
}

impl ClientsConfigLayer {
	pub fn merge(&mut self, other: ClientsConfigLayer) {
		if other.table.is_some() {
			self.table = other.table;
		}
		if other.signing_scheme.is_some() {
			self.signing_scheme = other.signing_scheme;
		}
	}

	pub fn build(self) -> Result<ClientsConfig, ConfigError> {
		let registry = match self.table {
			Some(table) => ClientRegistry::parse(table.expose())?,
			None => ClientRegistry::default(),
		};

		if registry.is_empty() {
			warn!("no API clients configured; every check-run request will be rejected");
		}

		let signing_scheme = match self.signing_scheme {
			Some(raw) => raw.parse().map_err(|e: checkers_common_signature::UnknownSchemeError| {
				ConfigError::InvalidValue {
					key: "clients.signing_scheme".to_string(),
					message: e.to_string(),
				}
			})?,
			None => SigningScheme::default(),
		};

		Ok(ClientsConfig {
			registry,
			signing_scheme,
		})
	}
}

#[derive(Debug, Clone, Default)]
pub struct ClientsConfig {
	pub registry: ClientRegistry,
	pub signing_scheme: SigningScheme,
}
