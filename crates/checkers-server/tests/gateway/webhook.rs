// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use axum::{
	body::Body,
	http::{Method, Request, StatusCode},
};
use checkers_common_signature::SigningScheme;
use checkers_server::routes::github::RERUN_UNSUPPORTED_COMMENT;
use serde_json::{json, Value};

use super::support::{MockGithub, TestApp};

fn installation_event(action: &str, id: u64, login: &str) -> Value {
	json!({
		"action": action,
		"installation": {
			"id": id,
			"account": { "login": login, "type": "Organization" }
		}
	})
}

fn rerequested_event(installation: Option<u64>) -> Value {
	let mut payload = json!({
		"action": "rerequested",
		"check_run": { "id": 17, "head_sha": "abcdef1" },
		"repository": { "name": "widgets", "owner": { "login": "acme" } }
	});
	if let Some(id) = installation {
		payload["installation"] = json!({ "id": id });
	}
	payload
}

fn raw_webhook(event: &str, body: &str, signature: Option<&str>) -> Request<Body> {
	let mut builder = Request::builder()
		.method(Method::POST)
		.uri("/api/github/webhook")
		.header("X-GitHub-Event", event);
	if let Some(signature) = signature {
		builder = builder.header("X-Hub-Signature-256", signature);
	}
	builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn installation_event_reloads_the_map() {
	let app = TestApp::new(&[("acme", 42), ("globex", 7)]);

	let (status, _) = app
		.send(app.signed(Method::POST, "/check/build/globex/widgets/abcdef1", None))
		.await;
	assert_eq!(status, StatusCode::CREATED);

	app.github.set_installations(&[("acme", 42)]);
	let (status, _) = app
		.webhook("installation", &installation_event("deleted", 7, "globex"))
		.await;
	assert_eq!(status, StatusCode::OK);
	assert_eq!(app.github.list_calls(), 2);

	let (status, body) = app
		.send(app.signed(Method::POST, "/check/build/globex/widgets/abcdef1", None))
		.await;
	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body["error"], "not_installed");
}

#[tokio::test]
async fn installation_event_adds_new_orgs() {
	let app = TestApp::new(&[("acme", 42)]);

	app.github.set_installations(&[("acme", 42), ("initech", 9)]);
	let (status, _) = app
		.webhook("installation", &installation_event("created", 9, "initech"))
		.await;
	assert_eq!(status, StatusCode::OK);

	let (status, _) = app
		.send(app.signed(Method::POST, "/check/lint/initech/tps/abcdef1", None))
		.await;
	assert_eq!(status, StatusCode::CREATED);
	assert_eq!(app.github.authorized(), vec![9]);
}

#[tokio::test]
async fn bad_signature_is_401() {
	let app = TestApp::new(&[("acme", 42)]);
	let body = installation_event("created", 1, "acme").to_string();

	let (status, body) = app
		.send(raw_webhook("installation", &body, Some("sha256=deadbeef")))
		.await;

	assert_eq!(status, StatusCode::UNAUTHORIZED);
	assert_eq!(body["error"], "unauthorized");
	assert_eq!(app.github.list_calls(), 0);
}

#[tokio::test]
async fn missing_signature_is_400() {
	let app = TestApp::new(&[("acme", 42)]);
	let (status, _) = app.send(raw_webhook("installation", "{}", None)).await;

	assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unconfigured_secret_is_500() {
	let github = Arc::new(MockGithub::with_installations(&[("acme", 42)]));
	let app = TestApp::build(github, SigningScheme::Legacy, None);

	let (status, body) = app
		.webhook("installation", &installation_event("created", 1, "acme"))
		.await;

	assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
	assert_eq!(body["error"], "internal_error");
}

#[tokio::test]
async fn rerequested_check_run_leaves_a_comment() {
	let app = TestApp::new(&[("acme", 42)]);

	let (status, _) = app
		.webhook("check_run", &rerequested_event(Some(42)))
		.await;
	assert_eq!(status, StatusCode::OK);

	let comments = app.github.comments();
	assert_eq!(comments.len(), 1);
	assert_eq!(comments[0].owner, "acme");
	assert_eq!(comments[0].repo, "widgets");
	assert_eq!(comments[0].commit_sha, "abcdef1");
	assert_eq!(comments[0].body, RERUN_UNSUPPORTED_COMMENT);
	assert_eq!(app.github.authorized(), vec![42]);
	assert_eq!(app.github.list_calls(), 0);
}

#[tokio::test]
async fn rerequested_without_installation_resolves_owner() {
	let app = TestApp::new(&[("acme", 42)]);

	let (status, _) = app.webhook("check_run", &rerequested_event(None)).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(app.github.authorized(), vec![42]);
	assert_eq!(app.github.comments().len(), 1);
}

#[tokio::test]
async fn other_check_run_actions_are_ignored() {
	let app = TestApp::new(&[("acme", 42)]);
	let mut payload = rerequested_event(Some(42));
	payload["action"] = json!("completed");

	let (status, _) = app.webhook("check_run", &payload).await;

	assert_eq!(status, StatusCode::OK);
	assert!(app.github.comments().is_empty());
}

#[tokio::test]
async fn unrelated_events_are_acknowledged() {
	let app = TestApp::new(&[("acme", 42)]);

	let (status, _) = app.webhook("push", &json!({ "ref": "refs/heads/main" })).await;

	assert_eq!(status, StatusCode::OK);
	assert_eq!(app.github.list_calls(), 0);
	assert!(app.github.comments().is_empty());
}
