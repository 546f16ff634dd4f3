// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
	body::Body,
	http::{Method, Request, StatusCode},
	Router,
};
use checkers_common_secret::SecretString;
use checkers_common_signature::{compute_request_signature, SigningInput, SigningScheme};
use checkers_github_app::{
	compute_webhook_signature, CommitComment, CreateCheckRun, GithubApi, GithubAppError,
	Installation, InstallationAccount, InstallationAuth, UpdateCheckRun, UpstreamResponse,
};
use checkers_server::{create_router, AppState};
use checkers_server_config::ClientRegistry;
use serde_json::{json, Value};
use tower::ServiceExt;

pub const CLIENT_KEY: &str = "ci";
pub const CLIENT_SECRET: &str = "s3cret";
pub const WEBHOOK_SECRET: &str = "hook-secret";

/// `GithubApi` double that records every call.
#[derive(Default)]
pub struct MockGithub {
	installations: Mutex<Vec<Installation>>,
	fail_listing: AtomicBool,
	authorize_failure: Mutex<Option<GithubAppError>>,
	create_failure: Mutex<Option<GithubAppError>>,
	update_failure: Mutex<Option<GithubAppError>>,
	list_calls: AtomicUsize,
	pub authorized: Mutex<Vec<u64>>,
	pub created: Mutex<Vec<CreateCheckRun>>,
	pub updated: Mutex<Vec<UpdateCheckRun>>,
	pub comments: Mutex<Vec<CommitComment>>,
}

impl MockGithub {
	pub fn with_installations(pairs: &[(&str, u64)]) -> Self {
		let mock = Self::default();
		mock.set_installations(pairs);
		mock
	}

	pub fn set_installations(&self, pairs: &[(&str, u64)]) {
		*self.installations.lock().unwrap() = pairs
			.iter()
			.map(|(login, id)| Installation {
				id: *id,
				account: Some(InstallationAccount {
					login: Some(login.to_string()),
					account_type: None,
				}),
			})
			.collect();
	}

	pub fn set_raw_installations(&self, installations: Vec<Installation>) {
		*self.installations.lock().unwrap() = installations;
	}

	pub fn fail_listing(&self) {
		self.fail_listing.store(true, Ordering::SeqCst);
	}

	pub fn fail_next_authorize(&self, err: GithubAppError) {
		*self.authorize_failure.lock().unwrap() = Some(err);
	}

	pub fn fail_next_create(&self, err: GithubAppError) {
		*self.create_failure.lock().unwrap() = Some(err);
	}

	pub fn fail_next_update(&self, err: GithubAppError) {
		*self.update_failure.lock().unwrap() = Some(err);
	}

	pub fn list_calls(&self) -> usize {
		self.list_calls.load(Ordering::SeqCst)
	}

	pub fn authorized(&self) -> Vec<u64> {
		self.authorized.lock().unwrap().clone()
	}

	pub fn created(&self) -> Vec<CreateCheckRun> {
		self.created.lock().unwrap().clone()
	}

	pub fn updated(&self) -> Vec<UpdateCheckRun> {
		self.updated.lock().unwrap().clone()
	}

	pub fn comments(&self) -> Vec<CommitComment> {
		self.comments.lock().unwrap().clone()
	}
}

#[async_trait]
impl GithubApi for MockGithub {
	async fn list_installations(&self) -> Result<Vec<Installation>, GithubAppError> {
		self.list_calls.fetch_add(1, Ordering::SeqCst);
		if self.fail_listing.load(Ordering::SeqCst) {
			return Err(GithubAppError::Timeout);
		}
		Ok(self.installations.lock().unwrap().clone())
	}

	async fn authorize(&self, installation_id: u64) -> Result<InstallationAuth, GithubAppError> {
		self.authorized.lock().unwrap().push(installation_id);
		if let Some(err) = self.authorize_failure.lock().unwrap().take() {
			return Err(err);
		}
		Ok(InstallationAuth {
			installation_id,
			token: SecretString::from(format!("ghs_{installation_id}")),
			expires_at: chrono::Utc::now() + chrono::Duration::hours(1),
		})
	}

	async fn create_check_run(
		&self,
		_auth: &InstallationAuth,
		request: &CreateCheckRun,
	) -> Result<UpstreamResponse, GithubAppError> {
		self.created.lock().unwrap().push(request.clone());
		if let Some(err) = self.create_failure.lock().unwrap().take() {
			return Err(err);
		}
		Ok(UpstreamResponse {
			status: 201,
			body: json!({
				"id": 1001,
				"name": request.name,
				"head_sha": request.head_sha,
				"status": request.fields.status.clone().unwrap_or_else(|| json!("queued")),
			}),
		})
	}

	async fn update_check_run(
		&self,
		_auth: &InstallationAuth,
		request: &UpdateCheckRun,
	) -> Result<UpstreamResponse, GithubAppError> {
		self.updated.lock().unwrap().push(request.clone());
		if let Some(err) = self.update_failure.lock().unwrap().take() {
			return Err(err);
		}
		Ok(UpstreamResponse {
			status: 200,
			body: json!({ "id": request.check_run_id, "conclusion": request.fields.conclusion }),
		})
	}

	async fn create_commit_comment(
		&self,
		_auth: &InstallationAuth,
		comment: &CommitComment,
	) -> Result<(), GithubAppError> {
		self.comments.lock().unwrap().push(comment.clone());
		Ok(())
	}
}

pub struct TestApp {
	pub router: Router,
	pub github: Arc<MockGithub>,
	pub scheme: SigningScheme,
}

impl TestApp {
	pub fn new(installations: &[(&str, u64)]) -> Self {
		Self::build(
			Arc::new(MockGithub::with_installations(installations)),
			SigningScheme::Legacy,
			Some(WEBHOOK_SECRET),
		)
	}

	pub fn build(
		github: Arc<MockGithub>,
		scheme: SigningScheme,
		webhook_secret: Option<&str>,
	) -> Self {
		let clients = ClientRegistry::parse(&format!("{CLIENT_KEY}:{CLIENT_SECRET};deploy:other")).unwrap();
		let state = AppState::new(
			github.clone(),
			clients,
			scheme,
			webhook_secret.map(SecretString::from),
		);
		Self {
			router: create_router(state),
			github,
			scheme,
		}
	}

	pub fn sign(&self, path: &str, content_length: Option<&str>) -> String {
		compute_request_signature(
			self.scheme,
			&SigningInput::new(path, content_length),
			CLIENT_SECRET.as_bytes(),
		)
	}

	/// A correctly signed request to `/api{path}`.
	pub fn signed(&self, method: Method, path: &str, body: Option<&str>) -> Request<Body> {
		let length = body.map(|b| b.len().to_string());
		let signature = self.sign(path, length.as_deref());
		request(method, path, body, Some(CLIENT_KEY), Some(&signature))
	}

	pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
		let response = self.router.clone().oneshot(request).await.unwrap();
		let status = response.status();
		let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
			.await
			.unwrap();
		let body = if bytes.is_empty() {
			Value::Null
		} else {
			serde_json::from_slice(&bytes).unwrap()
		};
		(status, body)
	}

	pub async fn webhook(&self, event: &str, payload: &Value) -> (StatusCode, Value) {
		let body = serde_json::to_vec(payload).unwrap();
		let signature = compute_webhook_signature(WEBHOOK_SECRET, &body);
		let request = Request::builder()
			.method(Method::POST)
			.uri("/api/github/webhook")
			.header("X-GitHub-Event", event)
			.header("X-Hub-Signature-256", signature)
			.header("Content-Type", "application/json")
			.body(Body::from(body))
			.unwrap();
		self.send(request).await
	}
}

/// A request to `/api{path}` with whatever credentials are given.
pub fn request(
	method: Method,
	path: &str,
	body: Option<&str>,
	client_key: Option<&str>,
	signature: Option<&str>,
) -> Request<Body> {
	let mut builder = Request::builder()
		.method(method)
		.uri(format!("/api{path}"));

	if let Some(key) = client_key {
		builder = builder.header("X-Client-Key", key);
	}
	if let Some(sig) = signature {
		builder = builder.header("X-Request-Signature", sig);
	}

	match body {
		Some(body) => builder
			.header("Content-Type", "application/json")
			.header("Content-Length", body.len().to_string())
			.body(Body::from(body.to_string()))
			.unwrap(),
		None => builder.body(Body::empty()).unwrap(),
	}
}
