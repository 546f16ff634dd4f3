// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! App-level JWTs, used to list installations and mint installation tokens.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::GithubAppError;

/// GitHub caps App JWTs at ten minutes.
pub const APP_JWT_LIFETIME: Duration = Duration::from_secs(9 * 60);

/// Backdated to tolerate clock drift between us and GitHub.
const ISSUED_AT_SKEW: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct AppClaims {
	pub iat: u64,
	pub exp: u64,
	pub iss: String,
}

/// A signed App JWT and the unix time it stops being accepted.
#[derive(Debug, Clone)]
pub struct AppJwt {
	pub token: String,
	pub expires_at_secs: u64,
}

/// Sign an RS256 App JWT with `iss` set to the App ID.
#[instrument(skip(private_key_pem))]
pub fn generate_app_jwt(app_id: u64, private_key_pem: &str) -> Result<AppJwt, GithubAppError> {
	let now = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.map_err(|e| GithubAppError::Jwt(format!("System time error: {e}")))?;

	let claims = AppClaims {
		iat: now.saturating_sub(ISSUED_AT_SKEW).as_secs(),
		exp: (now + APP_JWT_LIFETIME).as_secs(),
		iss: app_id.to_string(),
	};

	let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
		.map_err(|e| GithubAppError::Jwt(format!("Invalid RSA private key: {e}")))?;

	let token = encode(&Header::new(Algorithm::RS256), &claims, &key)
		.map_err(|e| GithubAppError::Jwt(format!("Failed to encode JWT: {e}")))?;

	debug!(app_id, exp = claims.exp, "Generated GitHub App JWT");

	Ok(AppJwt {
		token,
		expires_at_secs: claims.exp,
	})
}
