// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Client key and request signature checks for `/api/check` routes.

use axum::{
	extract::{OriginalUri, Request, State},
	http::HeaderMap,
	middleware::Next,
	response::Response,
};
use checkers_common_signature::{verify_request_signature, SigningInput, SigningScheme};
use checkers_server_config::ClientRegistry;
use thiserror::Error;
use tracing::{debug, warn};

use crate::api::AppState;
use crate::error::ServerError;

pub const CLIENT_KEY_HEADER: &str = "X-Client-Key";
pub const SIGNATURE_HEADER: &str = "X-Request-Signature";

/// Prefix the check routes are mounted under; signatures cover the path
/// after it.
pub const API_PREFIX: &str = "/api";

/// Why a request's credentials were rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignatureError {
	#[error("No X-Client-Key header provided")]
	MissingClientKey,

	#[error("Invalid client key")]
	UnknownClientKey,

	#[error("No X-Request-Signature header provided")]
	MissingSignature,

	#[error("Invalid request signature")]
	InvalidSignature,
}

impl From<SignatureError> for ServerError {
	fn from(e: SignatureError) -> Self {
		match e {
			SignatureError::MissingClientKey | SignatureError::MissingSignature => {
				ServerError::Unauthenticated(e.to_string())
			}
			SignatureError::UnknownClientKey | SignatureError::InvalidSignature => {
				ServerError::Forbidden(e.to_string())
			}
		}
	}
}

/// The request parts a signature check looks at.
#[derive(Debug, Clone, Copy)]
pub struct SignedRequest<'a> {
	pub client_key: Option<&'a str>,
	pub path: &'a str,
	pub content_length: Option<&'a str>,
	pub signature: Option<&'a str>,
}

impl<'a> SignedRequest<'a> {
	pub fn from_headers(headers: &'a HeaderMap, path: &'a str) -> Self {
		let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());
		Self {
			client_key: header(CLIENT_KEY_HEADER),
			path,
			content_length: header(axum::http::header::CONTENT_LENGTH.as_str()),
			signature: header(SIGNATURE_HEADER),
		}
	}
}

/// Check a request's client key and signature. Returns the client key.
pub fn verify_client_request<'a>(
	registry: &ClientRegistry,
	scheme: SigningScheme,
	request: &SignedRequest<'a>,
) -> Result<&'a str, SignatureError> {
	let client_key = request
		.client_key
		.filter(|k| !k.is_empty())
		.ok_or(SignatureError::MissingClientKey)?;

	let secret = registry
		.secret(client_key)
		.ok_or(SignatureError::UnknownClientKey)?;

	let signature = request
		.signature
		.filter(|s| !s.is_empty())
		.ok_or(SignatureError::MissingSignature)?;

	let input = SigningInput::new(request.path, request.content_length);
	if verify_request_signature(scheme, &input, secret.expose().as_bytes(), signature) {
		Ok(client_key)
	} else {
		Err(SignatureError::InvalidSignature)
	}
}

/// Request path relative to [`API_PREFIX`], without the query string.
fn signing_path(request: &Request) -> &str {
	let path = request
		.extensions()
		.get::<OriginalUri>()
		.map(|uri| uri.0.path())
		.unwrap_or_else(|| request.uri().path());
	match path.strip_prefix(API_PREFIX) {
		Some(rest) if rest.starts_with('/') => rest,
		_ => path,
	}
}

pub async fn client_auth_middleware(
	State(state): State<AppState>,
	request: Request,
	next: Next,
) -> Result<Response, ServerError> {
	let path = signing_path(&request);
	let signed = SignedRequest::from_headers(request.headers(), path);

	match verify_client_request(&state.clients, state.signing_scheme, &signed) {
		Ok(client_key) => {
			debug!(client_key, path, "client request authenticated");
		}
		Err(e) => {
			warn!(
				client_key = signed.client_key.unwrap_or("-"),
				path,
				reason = %e,
				"client request rejected"
			);
			return Err(e.into());
		}
	}

	Ok(next.run(request).await)
}

/// Make sure the installation map is loaded before a handler runs.
pub async fn installations_ready_middleware(
	State(state): State<AppState>,
	request: Request,
	next: Next,
) -> Result<Response, ServerError> {
	state
		.installations
		.ensure_loaded(false)
		.await
		.map_err(ServerError::CacheUnavailable)?;
	Ok(next.run(request).await)
}
