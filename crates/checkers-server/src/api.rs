// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Application state and router construction.

use std::sync::Arc;

use axum::{
	middleware,
	routing::{get, patch, post},
	Router,
};
use checkers_common_secret::SecretString;
use checkers_common_signature::SigningScheme;
use checkers_github_app::GithubApi;
use checkers_server_config::ClientRegistry;

use crate::authz::InstallationResolver;
use crate::client_auth::{client_auth_middleware, installations_ready_middleware, API_PREFIX};
use crate::installations::InstallationCache;
use crate::routes;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
	pub github: Arc<dyn GithubApi>,
	pub installations: Arc<InstallationCache>,
	pub resolver: InstallationResolver,
	pub clients: Arc<ClientRegistry>,
	pub signing_scheme: SigningScheme,
	pub webhook_secret: Option<SecretString>,
}

impl AppState {
	pub fn new(
		github: Arc<dyn GithubApi>,
		clients: ClientRegistry,
		signing_scheme: SigningScheme,
		webhook_secret: Option<SecretString>,
	) -> Self {
		let installations = Arc::new(InstallationCache::new(github.clone()));
		let resolver = InstallationResolver::new(installations.clone(), github.clone());
		Self {
			github,
			installations,
			resolver,
			clients: Arc::new(clients),
			signing_scheme,
			webhook_secret,
		}
	}
}

/// Build the router.
///
/// Check routes authenticate the client first and then make sure the
/// installation map is loaded. The webhook route carries its own
/// signature check.
pub fn create_router(state: AppState) -> Router {
	let check_routes = Router::new()
		.route(
			"/check/{check_name}/{owner}/{repo}/{sha}",
			post(routes::checks::create_check_run),
		)
		.route(
			"/check/{owner}/{repo}/{check_run_id}",
			patch(routes::checks::update_check_run),
		)
		.route_layer(middleware::from_fn_with_state(
			state.clone(),
			installations_ready_middleware,
		))
		.route_layer(middleware::from_fn_with_state(
			state.clone(),
			client_auth_middleware,
		));

	let api_routes = check_routes.route("/github/webhook", post(routes::github::github_webhook));

	Router::new()
		.route("/health", get(routes::health::health_check))
		.nest(API_PREFIX, api_routes)
		.with_state(state)
}
