// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Server error types and HTTP response conversions.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use checkers_github_app::GithubAppError;
use serde::{Deserialize, Serialize};

/// Everything a gateway request can fail with.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
	/// Credentials missing.
	#[error("Unauthenticated: {0}")]
	Unauthenticated(String),

	/// Credentials present but not accepted.
	#[error("Forbidden: {0}")]
	Forbidden(String),

	/// The organization has no installation of the App.
	#[error("Organization {org} does not have Checkers installed")]
	NotInstalled { org: String },

	/// Invalid request path or payload.
	#[error("Invalid request: {0}")]
	BadRequest(String),

	/// A GitHub call failed. `status` is what the client receives.
	#[error("Upstream error ({status}): {source}")]
	Upstream {
		status: StatusCode,
		#[source]
		source: GithubAppError,
	},

	/// The installation map could not be loaded.
	#[error("Installation cache unavailable: {0}")]
	CacheUnavailable(#[source] GithubAppError),

	/// Internal server error.
	#[error("Internal error: {0}")]
	Internal(String),
}

impl ServerError {
	/// An upstream failure reported as 500, whatever GitHub answered.
	pub fn upstream(source: GithubAppError) -> Self {
		ServerError::Upstream {
			status: StatusCode::INTERNAL_SERVER_ERROR,
			source,
		}
	}

	/// An upstream failure that carries GitHub's status when it has one.
	pub fn upstream_with_status(source: GithubAppError) -> Self {
		let status = source
			.upstream_status()
			.and_then(|s| StatusCode::from_u16(s).ok())
			.filter(|s| s.is_client_error() || s.is_server_error())
			.unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
		ServerError::Upstream { status, source }
	}
}

/// Error response body. Both fields are always present.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
	pub error: String,
	pub message: String,
}

impl ErrorResponse {
	fn new(error: &str, message: impl Into<String>) -> Self {
		Self {
			error: error.to_string(),
			message: message.into(),
		}
	}
}

impl IntoResponse for ServerError {
	fn into_response(self) -> Response {
		let (status, body) = match &self {
			ServerError::Unauthenticated(msg) => {
				tracing::warn!(error = %msg, "unauthenticated");
				(
					StatusCode::UNAUTHORIZED,
					ErrorResponse::new("unauthorized", msg.clone()),
				)
			}
			ServerError::Forbidden(msg) => {
				tracing::warn!(error = %msg, "forbidden");
				(
					StatusCode::FORBIDDEN,
					ErrorResponse::new("forbidden", msg.clone()),
				)
			}
			ServerError::NotInstalled { org } => {
				tracing::info!(org = %org, "organization not installed");
				(
					StatusCode::FORBIDDEN,
					ErrorResponse::new(
						"not_installed",
						"Organization does not have Checkers installed",
					),
				)
			}
			ServerError::BadRequest(msg) => (
				StatusCode::BAD_REQUEST,
				ErrorResponse::new("bad_request", msg.clone()),
			),
			ServerError::Upstream { status, source } => {
				tracing::warn!(error = %source, status = status.as_u16(), "upstream error");
				(
					*status,
					ErrorResponse::new("upstream_error", source.public_message()),
				)
			}
			ServerError::CacheUnavailable(source) => {
				tracing::error!(error = %source, "failed to load installations");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse::new(
						"installations_unavailable",
						"Failed to load GitHub App installations",
					),
				)
			}
			ServerError::Internal(msg) => {
				tracing::error!(error = %msg, "internal error");
				(
					StatusCode::INTERNAL_SERVER_ERROR,
					ErrorResponse::new("internal_error", "An internal error occurred"),
				)
			}
		};

		(status, Json(body)).into_response()
	}
}
