// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Check-run create and update handlers.
//!
//! By the time these run the client is authenticated and the installation
//! map is loaded (see `client_auth`). Each handler validates its input,
//! resolves the owner to an installation token, makes exactly one GitHub
//! call and relays GitHub's status and body.

use axum::{
	body::Bytes,
	extract::{Path, State},
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use checkers_github_app::{CheckRunFields, CreateCheckRun, UpdateCheckRun, UpstreamResponse};
use tracing::{info, instrument};

use crate::api::AppState;
use crate::error::ServerError;

/// POST /api/check/{check_name}/{owner}/{repo}/{sha}
#[instrument(skip(state, body), fields(owner = %owner, repo = %repo, check_name = %check_name))]
pub async fn create_check_run(
	State(state): State<AppState>,
	Path((check_name, owner, repo, sha)): Path<(String, String, String, String)>,
	body: Bytes,
) -> Result<Response, ServerError> {
	require_non_empty(&[
		("check name", check_name.as_str()),
		("owner", owner.as_str()),
		("repository", repo.as_str()),
		("commit SHA", sha.as_str()),
	])?;

	let fields = parse_optional_fields(&body)?;
	let auth = state.resolver.authorize(&owner).await?;

	let request = CreateCheckRun {
		owner,
		repo,
		name: check_name,
		head_sha: sha,
		fields,
	};

	let response = state
		.github
		.create_check_run(&auth, &request)
		.await
		.map_err(ServerError::upstream)?;

	info!(status = response.status, "check run created");
	relay(response)
}

/// PATCH /api/check/{owner}/{repo}/{check_run_id}
#[instrument(skip(state, body), fields(owner = %owner, repo = %repo, check_run_id = %check_run_id))]
pub async fn update_check_run(
	State(state): State<AppState>,
	Path((owner, repo, check_run_id)): Path<(String, String, String)>,
	body: Bytes,
) -> Result<Response, ServerError> {
	let check_run_id = parse_check_run_id(&check_run_id)?;

	require_non_empty(&[("owner", owner.as_str()), ("repository", repo.as_str())])?;

	let fields = parse_required_fields(&body)?;
	let installation_id = state.resolver.resolve(&owner).await?;
	let auth = state
		.resolver
		.authorize_installation(installation_id)
		.await
		.map_err(ServerError::upstream_with_status)?;

	let request = UpdateCheckRun {
		owner,
		repo,
		check_run_id,
		fields,
	};

	let response = state
		.github
		.update_check_run(&auth, &request)
		.await
		.map_err(ServerError::upstream_with_status)?;

	info!(status = response.status, "check run updated");
	relay(response)
}

fn require_non_empty(params: &[(&str, &str)]) -> Result<(), ServerError> {
	for (name, value) in params {
		if value.is_empty() {
			return Err(ServerError::BadRequest(format!("Missing {name}")));
		}
	}
	Ok(())
}

/// Check run ids are unsigned decimal integers.
pub fn parse_check_run_id(raw: &str) -> Result<u64, ServerError> {
	raw
		.parse::<u64>()
		.map_err(|_| ServerError::BadRequest("Invalid check run ID".to_string()))
}

/// An empty body means no optional fields.
fn parse_optional_fields(body: &[u8]) -> Result<CheckRunFields, ServerError> {
	if body.iter().all(u8::is_ascii_whitespace) {
		return Ok(CheckRunFields::default());
	}
	parse_fields(body)
}

fn parse_required_fields(body: &[u8]) -> Result<CheckRunFields, ServerError> {
	if body.iter().all(u8::is_ascii_whitespace) {
		return Err(ServerError::BadRequest(
			"Request body must be a JSON object".to_string(),
		));
	}
	parse_fields(body)
}

fn parse_fields(body: &[u8]) -> Result<CheckRunFields, ServerError> {
	serde_json::from_slice::<Option<CheckRunFields>>(body)
		.map(Option::unwrap_or_default)
		.map_err(|e| ServerError::BadRequest(format!("Invalid JSON body: {e}")))
}

fn relay(response: UpstreamResponse) -> Result<Response, ServerError> {
	let status = StatusCode::from_u16(response.status)
		.map_err(|_| ServerError::Internal(format!("GitHub returned status {}", response.status)))?;

	if response.body.is_null() {
		return Ok(status.into_response());
	}
	Ok((status, Json(response.body)).into_response())
}
