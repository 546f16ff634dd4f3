// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! GitHub App webhook receiver.

use axum::{
	body::Bytes,
	extract::State,
	http::{HeaderMap, StatusCode},
	response::IntoResponse,
};
use checkers_github_app::{
	verify_webhook_signature, CheckRunWebhookPayload, CommitComment, InstallationWebhookPayload,
};

use crate::api::AppState;
use crate::error::ServerError;

pub const RERUN_UNSUPPORTED_COMMENT: &str =
	"Sorry, checks cannot be re-requested in Checkers. Try re-running the underlying CI job instead.";

/// POST /api/github/webhook
pub async fn github_webhook(
	State(state): State<AppState>,
	headers: HeaderMap,
	body: Bytes,
) -> Result<impl IntoResponse, ServerError> {
	let event_type = headers
		.get("X-GitHub-Event")
		.and_then(|v| v.to_str().ok())
		.unwrap_or("unknown");

	tracing::debug!(event_type = %event_type, "github_webhook: received event");

	let secret = state.webhook_secret.as_ref().ok_or_else(|| {
		tracing::error!("github_webhook: webhook secret not configured");
		ServerError::Internal("GitHub webhook secret is not configured on the server".into())
	})?;

	let sig_header = headers
		.get("X-Hub-Signature-256")
		.and_then(|v| v.to_str().ok())
		.ok_or_else(|| {
			tracing::warn!("github_webhook: missing X-Hub-Signature-256 header");
			ServerError::BadRequest("Missing X-Hub-Signature-256 header".into())
		})?;

	if let Err(e) = verify_webhook_signature(secret.expose(), sig_header, &body) {
		tracing::warn!(error = %e, "github_webhook: signature verification failed");
		return Err(ServerError::Unauthenticated(
			"Invalid webhook signature".into(),
		));
	}

	match event_type {
		"installation" => handle_installation(&state, &body).await?,
		"check_run" => handle_check_run(&state, &body).await?,
		_ => {
			tracing::debug!(event_type = %event_type, "github_webhook: ignoring event");
		}
	}

	Ok(StatusCode::OK)
}

/// Any installation change forces a full reload of the installation map.
async fn handle_installation(state: &AppState, body: &[u8]) -> Result<(), ServerError> {
	match serde_json::from_slice::<InstallationWebhookPayload>(body) {
		Ok(payload) => tracing::info!(
			action = %payload.action,
			installation_id = payload.installation.id,
			account_login = payload.installation.login().unwrap_or("-"),
			"github_webhook: installation event"
		),
		Err(e) => tracing::debug!(error = %e, "github_webhook: unrecognised installation payload"),
	}

	state
		.installations
		.invalidate()
		.await
		.map_err(ServerError::CacheUnavailable)
}

/// Re-runs can't be honoured, so say so on the commit.
async fn handle_check_run(state: &AppState, body: &[u8]) -> Result<(), ServerError> {
	let payload: CheckRunWebhookPayload = serde_json::from_slice(body)
		.map_err(|e| ServerError::BadRequest(format!("Invalid webhook payload: {e}")))?;

	if payload.action != "rerequested" {
		tracing::debug!(action = %payload.action, "github_webhook: ignoring check_run action");
		return Ok(());
	}

	let owner = payload.repository.owner.login;
	tracing::info!(
		owner = %owner,
		repo = %payload.repository.name,
		check_run_id = payload.check_run.id,
		"github_webhook: check run re-requested"
	);

	let auth = match payload.installation {
		Some(installation) => state
			.resolver
			.authorize_installation(installation.id)
			.await
			.map_err(ServerError::upstream)?,
		None => {
			state
				.installations
				.ensure_loaded(false)
				.await
				.map_err(ServerError::CacheUnavailable)?;
			state.resolver.authorize(&owner).await?
		}
	};

	let comment = CommitComment {
		owner,
		repo: payload.repository.name,
		commit_sha: payload.check_run.head_sha,
		body: RERUN_UNSUPPORTED_COMMENT.to_string(),
	};

	state
		.github
		.create_commit_comment(&auth, &comment)
		.await
		.map_err(ServerError::upstream)
}
