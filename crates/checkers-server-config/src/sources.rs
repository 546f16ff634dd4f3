// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources: defaults, TOML files and environment variables.

use std::path::PathBuf;

use checkers_common_secret::load_secret_env;
use tracing::{debug, trace};

use crate::error::ConfigError;
use crate::layer::ServerConfigLayer;
use crate::sections::{ClientsConfigLayer, GithubAppConfigLayer, HttpConfigLayer, LoggingConfigLayer};

/// Client table variable used by deployments that predate the
/// `CHECKERS_SERVER_` prefix.
pub const LEGACY_CLIENTS_VAR: &str = "CLIENTS";

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<ServerConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(ServerConfigLayer::default())
	}
}

/// TOML file configuration source. A missing file is an empty layer.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/checkers/server.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(ServerConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: ServerConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: `CHECKERS_SERVER_<FIELD>`. Secrets also accept `<VAR>_FILE`.
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<ServerConfigLayer, ConfigError> {
		debug!("loading environment variables");
		Ok(ServerConfigLayer {
			http: Some(load_http_from_env()?),
			github_app: Some(load_github_app_from_env()?),
			clients: Some(load_clients_from_env()?),
			logging: Some(load_logging_from_env()),
		})
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_bool(name: &str) -> Option<bool> {
	env_var(name).map(|v| v.eq_ignore_ascii_case("true") || v == "1")
}

fn env_parse<T: std::str::FromStr>(name: &str, kind: &str) -> Result<Option<T>, ConfigError> {
	match env_var(name) {
		Some(v) => v.parse().map(Some).map_err(|_| ConfigError::InvalidValue {
			key: name.to_string(),
			message: format!("invalid {kind} value '{v}'"),
		}),
		None => Ok(None),
	}
}

fn load_http_from_env() -> Result<HttpConfigLayer, ConfigError> {
	Ok(HttpConfigLayer {
		host: env_var("CHECKERS_SERVER_HOST"),
		port: env_parse("CHECKERS_SERVER_PORT", "u16")?,
	})
}

fn load_github_app_from_env() -> Result<GithubAppConfigLayer, ConfigError> {
	Ok(GithubAppConfigLayer {
		app_id: env_parse("CHECKERS_SERVER_GITHUB_APP_ID", "u64")?,
		private_key_pem: load_secret_env("CHECKERS_SERVER_GITHUB_APP_PRIVATE_KEY")?,
		webhook_secret: load_secret_env("CHECKERS_SERVER_GITHUB_APP_WEBHOOK_SECRET")?,
		base_url: env_var("CHECKERS_SERVER_GITHUB_APP_BASE_URL"),
	})
}

fn load_clients_from_env() -> Result<ClientsConfigLayer, ConfigError> {
	let table = match load_secret_env("CHECKERS_SERVER_CLIENTS")? {
		Some(table) => Some(table),
		None => {
			let legacy = load_secret_env(LEGACY_CLIENTS_VAR)?;
			if legacy.is_some() {
				debug!("using legacy CLIENTS variable for the client table");
			}
			legacy
		}
	};

	Ok(ClientsConfigLayer {
		table,
		signing_scheme: env_var("CHECKERS_SERVER_SIGNING_SCHEME"),
	})
}

fn load_logging_from_env() -> LoggingConfigLayer {
	LoggingConfigLayer {
		level: env_var("CHECKERS_SERVER_LOG_LEVEL"),
		json: env_bool("CHECKERS_SERVER_LOG_JSON"),
	}
}
