// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections for checkers-server.

pub mod clients;
pub mod github_app;
pub mod http;
pub mod logging;

pub use clients::{ClientRegistry, ClientsConfig, ClientsConfigLayer};
pub use github_app::GithubAppConfigLayer;
pub use http::{HttpConfig, HttpConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
