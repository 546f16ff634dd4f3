// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use checkers_common_signature::SigningScheme;
use serde_json::json;

use super::support::{request, MockGithub, TestApp, CLIENT_KEY};

const PATH: &str = "/check/build/acme/widgets/abcdef1";

#[tokio::test]
async fn missing_client_key_is_401() {
	let app = TestApp::new(&[("acme", 42)]);
	let (status, body) = app
		.send(request(Method::POST, PATH, None, None, Some("abc")))
		.await;

	assert_eq!(status, StatusCode::UNAUTHORIZED);
	assert_eq!(
		body,
		json!({ "error": "unauthorized", "message": "No X-Client-Key header provided" })
	);
}

#[tokio::test]
async fn unknown_client_key_is_403() {
	let app = TestApp::new(&[("acme", 42)]);
	let (status, body) = app
		.send(request(Method::POST, PATH, None, Some("intruder"), Some("abc")))
		.await;

	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body["message"], "Invalid client key");
}

#[tokio::test]
async fn missing_signature_is_401() {
	let app = TestApp::new(&[("acme", 42)]);
	let (status, body) = app
		.send(request(Method::POST, PATH, None, Some(CLIENT_KEY), None))
		.await;

	assert_eq!(status, StatusCode::UNAUTHORIZED);
	assert_eq!(body["message"], "No X-Request-Signature header provided");
}

#[tokio::test]
async fn wrong_signature_is_403_and_touches_nothing_upstream() {
	let app = TestApp::new(&[("acme", 42)]);
	let bad = "0".repeat(64);
	let (status, body) = app
		.send(request(Method::POST, PATH, None, Some(CLIENT_KEY), Some(&bad)))
		.await;

	assert_eq!(status, StatusCode::FORBIDDEN);
	assert_eq!(body["message"], "Invalid request signature");
	assert_eq!(app.github.list_calls(), 0);
	assert!(app.github.created().is_empty());
}

#[tokio::test]
async fn short_signature_fails_closed() {
	let app = TestApp::new(&[("acme", 42)]);
	let full = app.sign(PATH, None);
	let (status, _) = app
		.send(request(
			Method::POST,
			PATH,
			None,
			Some(CLIENT_KEY),
			Some(&full[..63]),
		))
		.await;

	assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn signature_covers_content_length() {
	let app = TestApp::new(&[("acme", 42)]);
	let body = r#"{"status":"in_progress"}"#;
	let signed_for_empty = app.sign(PATH, None);

	let (status, _) = app
		.send(request(
			Method::POST,
			PATH,
			Some(body),
			Some(CLIENT_KEY),
			Some(&signed_for_empty),
		))
		.await;

	assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn signature_excludes_query_string() {
	let app = TestApp::new(&[("acme", 42)]);
	let signature = app.sign(PATH, None);

	let (status, _) = app
		.send(request(
			Method::POST,
			&format!("{PATH}?trace=1"),
			None,
			Some(CLIENT_KEY),
			Some(&signature),
		))
		.await;

	assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn second_client_has_its_own_secret() {
	let app = TestApp::new(&[("acme", 42)]);
	let ci_signature = app.sign(PATH, None);

	let (status, _) = app
		.send(request(
			Method::POST,
			PATH,
			None,
			Some("deploy"),
			Some(&ci_signature),
		))
		.await;

	assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn hmac_scheme_accepts_hmac_signatures_only() {
	let github = Arc::new(MockGithub::with_installations(&[("acme", 42)]));
	let hmac_app = TestApp::build(github.clone(), SigningScheme::HmacSha256, None);
	let legacy_app = TestApp::build(github, SigningScheme::Legacy, None);

	let (status, _) = hmac_app.send(hmac_app.signed(Method::POST, PATH, None)).await;
	assert_eq!(status, StatusCode::CREATED);

	let (status, _) = hmac_app
		.send(legacy_app.signed(Method::POST, PATH, None))
		.await;
	assert_eq!(status, StatusCode::FORBIDDEN);
}
