// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! [`GithubApi`] over the GitHub REST API, authenticated as a GitHub App.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, trace, warn};

use crate::api::{GithubApi, InstallationAuth};
use crate::config::GithubAppConfig;
use crate::error::GithubAppError;
use crate::jwt::{generate_app_jwt, AppJwt};
use crate::types::{
	AccessTokenResponse, CommitComment, CreateCheckRun, CreateCheckRunBody, GitHubErrorResponse,
	Installation, UpdateCheckRun, UpstreamResponse,
};

/// Largest page GitHub serves for installation listings.
pub const INSTALLATIONS_PER_PAGE: usize = 100;

const JWT_REFRESH_MARGIN_SECS: u64 = 30;
const USER_AGENT: &str = "checkers-github-app";
const API_VERSION: &str = "2022-11-28";

/// GitHub App client.
///
/// The App JWT is cached until shortly before it expires. Installation tokens
/// are issued fresh on every [`GithubApi::authorize`] call and never cached.
#[derive(Clone)]
pub struct GithubAppClient {
	http_client: Client,
	config: GithubAppConfig,
	app_jwt_cache: Arc<Mutex<Option<AppJwt>>>,
	/// Serializes App JWT generation
	app_jwt_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for GithubAppClient {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("GithubAppClient")
			.field("config", &self.config)
			.finish_non_exhaustive()
	}
}

impl GithubAppClient {
	pub fn new(config: GithubAppConfig) -> Result<Self, GithubAppError> {
		let http_client = Client::builder()
			.timeout(config.request_timeout())
			.user_agent(USER_AGENT)
			.build()
			.map_err(|e| GithubAppError::Config(format!("Failed to create HTTP client: {e}")))?;

		info!(
			app_id = config.app_id(),
			base_url = %config.base_url(),
			"Created GitHub App client"
		);

		Ok(Self {
			http_client,
			config,
			app_jwt_cache: Arc::new(Mutex::new(None)),
			app_jwt_lock: Arc::new(Mutex::new(())),
		})
	}

	pub fn config(&self) -> &GithubAppConfig {
		&self.config
	}

	async fn cached_app_jwt(&self) -> Option<String> {
		let now = unix_now();
		let cache = self.app_jwt_cache.lock().await;
		cache
			.as_ref()
			.filter(|jwt| now + JWT_REFRESH_MARGIN_SECS < jwt.expires_at_secs)
			.map(|jwt| jwt.token.clone())
	}

	/// Get or generate an App JWT, with double-checked locking so concurrent
	/// callers sign at most once.
	#[instrument(skip(self))]
	async fn get_app_jwt(&self) -> Result<String, GithubAppError> {
		if let Some(token) = self.cached_app_jwt().await {
			trace!("Using cached App JWT");
			return Ok(token);
		}

		let _guard = self.app_jwt_lock.lock().await;

		if let Some(token) = self.cached_app_jwt().await {
			trace!("Using cached App JWT (post-lock)");
			return Ok(token);
		}

		debug!(app_id = self.config.app_id(), "Generating new App JWT");
		let jwt = generate_app_jwt(self.config.app_id(), self.config.private_key_pem())?;
		let token = jwt.token.clone();
		*self.app_jwt_cache.lock().await = Some(jwt);

		Ok(token)
	}

	async fn invalidate_app_jwt(&self) {
		if self.app_jwt_cache.lock().await.take().is_some() {
			info!("Invalidated App JWT cache");
		}
	}

	/// `base_url` with `segments` appended, each percent-encoded.
	fn endpoint(&self, segments: &[&str]) -> Result<Url, GithubAppError> {
		let mut url = self.config.base_url().clone();
		url
			.path_segments_mut()
			.map_err(|_| GithubAppError::Config("GitHub base URL cannot be a base".to_string()))?
			.pop_if_empty()
			.extend(segments);
		Ok(url)
	}

	fn authed(&self, builder: RequestBuilder, bearer: &str) -> RequestBuilder {
		builder
			.bearer_auth(bearer)
			.header("Accept", "application/vnd.github+json")
			.header("X-GitHub-Api-Version", API_VERSION)
	}

	async fn send(&self, builder: RequestBuilder, what: &str) -> Result<Response, GithubAppError> {
		let response = builder.send().await.map_err(|e| {
			if e.is_timeout() {
				error!(request = what, "GitHub request timed out");
				return GithubAppError::Timeout;
			}
			error!(request = what, error = %e, "Network error calling GitHub");
			GithubAppError::Network(e)
		})?;

		let status = response.status();
		if status.is_success() {
			return Ok(response);
		}

		let body = response.text().await.unwrap_or_default();
		Err(map_github_error(status, &body))
	}

	async fn send_json<B: Serialize + ?Sized>(
		&self,
		builder: RequestBuilder,
		body: &B,
		what: &str,
	) -> Result<UpstreamResponse, GithubAppError> {
		let response = self.send(builder.json(body), what).await?;
		let status = response.status().as_u16();
		let bytes = response.bytes().await?;

		let body = if bytes.is_empty() {
			serde_json::Value::Null
		} else {
			serde_json::from_slice(&bytes).map_err(|e| {
				error!(request = what, error = %e, "Failed to parse GitHub response");
				GithubAppError::InvalidResponse(format!("JSON parse error: {e}"))
			})?
		};

		Ok(UpstreamResponse { status, body })
	}

	async fn list_installations_page(
		&self,
		jwt: &str,
		page: usize,
	) -> Result<Vec<Installation>, GithubAppError> {
		let mut url = self.endpoint(&["app", "installations"])?;
		url
			.query_pairs_mut()
			.append_pair("per_page", &INSTALLATIONS_PER_PAGE.to_string())
			.append_pair("page", &page.to_string());

		let request = self.authed(self.http_client.get(url), jwt);
		let response = match self.send(request, "list_installations").await {
			Err(GithubAppError::Unauthorized) => {
				self.invalidate_app_jwt().await;
				return Err(GithubAppError::Unauthorized);
			}
			other => other?,
		};

		response.json().await.map_err(|e| {
			error!(error = %e, "Failed to parse installations response");
			GithubAppError::InvalidResponse(format!("JSON parse error: {e}"))
		})
	}
}

#[async_trait]
impl GithubApi for GithubAppClient {
	#[instrument(skip(self))]
	async fn list_installations(&self) -> Result<Vec<Installation>, GithubAppError> {
		let jwt = self.get_app_jwt().await?;
		let mut installations = Vec::new();
		let mut page = 1;

		loop {
			let batch = self.list_installations_page(&jwt, page).await?;
			let count = batch.len();
			installations.extend(batch);
			trace!(page, count, "Fetched installations page");

			if count < INSTALLATIONS_PER_PAGE {
				break;
			}
			page += 1;
		}

		debug!(
			total = installations.len(),
			pages = page,
			"Listed GitHub App installations"
		);
		Ok(installations)
	}

	#[instrument(skip(self))]
	async fn authorize(&self, installation_id: u64) -> Result<InstallationAuth, GithubAppError> {
		let jwt = self.get_app_jwt().await?;
		let url = self.endpoint(&[
			"app",
			"installations",
			&installation_id.to_string(),
			"access_tokens",
		])?;

		let request = self.authed(self.http_client.post(url), &jwt);
		let response = match self.send(request, "access_tokens").await {
			Err(GithubAppError::Unauthorized) => {
				self.invalidate_app_jwt().await;
				return Err(GithubAppError::Unauthorized);
			}
			other => other?,
		};

		let token: AccessTokenResponse = response.json().await.map_err(|e| {
			error!(error = %e, "Failed to parse access token response");
			GithubAppError::InvalidResponse(format!("JSON parse error: {e}"))
		})?;

		debug!(installation_id, expires_at = %token.expires_at, "Issued installation token");
		Ok(InstallationAuth {
			installation_id,
			token: token.token.into(),
			expires_at: token.expires_at,
		})
	}

	#[instrument(skip(self, auth, request), fields(owner = %request.owner, repo = %request.repo, name = %request.name))]
	async fn create_check_run(
		&self,
		auth: &InstallationAuth,
		request: &CreateCheckRun,
	) -> Result<UpstreamResponse, GithubAppError> {
		let url = self.endpoint(&["repos", &request.owner, &request.repo, "check-runs"])?;
		let body = CreateCheckRunBody {
			name: &request.name,
			head_sha: &request.head_sha,
			fields: &request.fields,
		};

		let builder = self.authed(self.http_client.post(url), auth.token.expose());
		let response = self.send_json(builder, &body, "create_check_run").await?;
		info!(status = response.status, "Created check run");
		Ok(response)
	}

	#[instrument(skip(self, auth, request), fields(owner = %request.owner, repo = %request.repo, check_run_id = request.check_run_id))]
	async fn update_check_run(
		&self,
		auth: &InstallationAuth,
		request: &UpdateCheckRun,
	) -> Result<UpstreamResponse, GithubAppError> {
		let url = self.endpoint(&[
			"repos",
			&request.owner,
			&request.repo,
			"check-runs",
			&request.check_run_id.to_string(),
		])?;

		let builder = self.authed(self.http_client.patch(url), auth.token.expose());
		let response = self
			.send_json(builder, &request.fields, "update_check_run")
			.await?;
		info!(status = response.status, "Updated check run");
		Ok(response)
	}

	#[instrument(skip(self, auth, comment), fields(owner = %comment.owner, repo = %comment.repo, sha = %comment.commit_sha))]
	async fn create_commit_comment(
		&self,
		auth: &InstallationAuth,
		comment: &CommitComment,
	) -> Result<(), GithubAppError> {
		let url = self.endpoint(&[
			"repos",
			&comment.owner,
			&comment.repo,
			"commits",
			&comment.commit_sha,
			"comments",
		])?;

		let body = serde_json::json!({ "body": comment.body });
		let builder = self.authed(self.http_client.post(url), auth.token.expose());
		self.send_json(builder, &body, "create_commit_comment").await?;
		Ok(())
	}
}

fn unix_now() -> u64 {
	SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.unwrap_or(Duration::ZERO)
		.as_secs()
}

/// Map a failed GitHub response to an error, keeping GitHub's `message`.
pub(crate) fn map_github_error(status: StatusCode, body: &str) -> GithubAppError {
	let status_code = status.as_u16();
	let message = serde_json::from_str::<GitHubErrorResponse>(body)
		.map(|e| e.message)
		.unwrap_or_else(|_| {
			status
				.canonical_reason()
				.unwrap_or("GitHub request failed")
				.to_string()
		});

	match status_code {
		401 => {
			warn!(status = status_code, "Unauthorized request to GitHub");
			GithubAppError::Unauthorized
		}
		429 => {
			warn!(status = status_code, "GitHub rate limit exceeded");
			GithubAppError::RateLimited {
				status: status_code,
			}
		}
		403 if message.to_lowercase().contains("rate limit") => {
			warn!(status = status_code, "GitHub rate limit exceeded");
			GithubAppError::RateLimited {
				status: status_code,
			}
		}
		_ => {
			error!(status = status_code, message = %message, "GitHub API error");
			GithubAppError::ApiError {
				status: status_code,
				message,
			}
		}
	}
}
