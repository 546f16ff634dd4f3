// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! GitHub App client for Checkers.
//!
//! [`GithubApi`] is the capability the gateway consumes: list the App's
//! installations, issue an installation-scoped authorization, create and
//! update check runs, and leave commit comments. [`GithubAppClient`] is the
//! real implementation over the GitHub REST API; tests substitute their own.

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;
pub mod webhook;

pub use api::{GithubApi, InstallationAuth};
pub use client::GithubAppClient;
pub use config::GithubAppConfig;
pub use error::GithubAppError;
pub use types::{
	CheckRunFields, CheckRunWebhookPayload, CommitComment, CreateCheckRun, Installation,
	InstallationAccount, InstallationWebhookPayload, UpdateCheckRun, UpstreamResponse,
};
pub use webhook::{compute_webhook_signature, verify_webhook_signature};
