// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Error types for the GitHub App client.

use thiserror::Error;

/// Errors that can occur when talking to the GitHub API.
#[derive(Debug, Error)]
pub enum GithubAppError {
	/// Network-level error during HTTP communication.
	#[error("Network error: {0}")]
	Network(#[from] reqwest::Error),

	/// Request timed out.
	#[error("Request timed out")]
	Timeout,

	/// GitHub rejected the App JWT or installation token.
	#[error("Unauthorized or invalid app configuration")]
	Unauthorized,

	/// Forbidden - insufficient permissions.
	#[error("Forbidden or insufficient permissions")]
	Forbidden,

	/// Rate limit exceeded.
	#[error("Rate limit exceeded (HTTP {status})")]
	RateLimited { status: u16 },

	/// GitHub API returned an error.
	#[error("GitHub API error: {status} - {message}")]
	ApiError { status: u16, message: String },

	/// Invalid or unparseable response.
	#[error("Invalid response from GitHub: {0}")]
	InvalidResponse(String),

	/// Configuration error.
	#[error("Configuration error: {0}")]
	Config(String),

	/// JWT signing/encoding error.
	#[error("JWT error: {0}")]
	Jwt(String),

	/// Webhook signature verification failed.
	#[error("Invalid webhook signature")]
	InvalidWebhookSignature,
}

impl GithubAppError {
	/// Create an API error from status code and message.
	pub fn api_error(status: u16, message: impl Into<String>) -> Self {
		Self::ApiError {
			status,
			message: message.into(),
		}
	}

	/// HTTP status GitHub reported for this failure, if it got that far.
	pub fn upstream_status(&self) -> Option<u16> {
		match self {
			GithubAppError::Unauthorized => Some(401),
			GithubAppError::Forbidden => Some(403),
			GithubAppError::RateLimited { status } | GithubAppError::ApiError { status, .. } => {
				Some(*status)
			}
			_ => None,
		}
	}

	/// Message safe to return to gateway clients.
	///
	/// GitHub's own error message is passed on; transport and configuration
	/// details stay in the server logs.
	pub fn public_message(&self) -> String {
		match self {
			GithubAppError::ApiError { message, .. } => message.clone(),
			GithubAppError::Network(_) => "Failed to reach GitHub".to_string(),
			GithubAppError::Timeout => "GitHub request timed out".to_string(),
			GithubAppError::Unauthorized => "GitHub rejected the app credentials".to_string(),
			GithubAppError::Forbidden => "GitHub denied the request".to_string(),
			GithubAppError::RateLimited { .. } => "GitHub rate limit exceeded".to_string(),
			GithubAppError::InvalidResponse(_) => "Invalid response from GitHub".to_string(),
			GithubAppError::Config(_) | GithubAppError::Jwt(_) => {
				"GitHub App is not configured correctly".to_string()
			}
			GithubAppError::InvalidWebhookSignature => "Invalid webhook signature".to_string(),
		}
	}
}
