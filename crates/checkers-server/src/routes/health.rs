// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Health HTTP handler.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::AppState;

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
	pub status: String,
	pub version: String,
	pub installations: InstallationsHealth,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallationsHealth {
	pub loaded: bool,
	pub count: usize,
}

/// GET /health - liveness plus installation cache state.
///
/// Never triggers a load; an unloaded cache is normal before the first
/// check-run request.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
	let snapshot = state.installations.snapshot().await;

	Json(HealthResponse {
		status: "ok".to_string(),
		version: env!("CARGO_PKG_VERSION").to_string(),
		installations: InstallationsHealth {
			loaded: snapshot.is_some(),
			count: snapshot.map(|map| map.len()).unwrap_or(0),
		},
	})
}
