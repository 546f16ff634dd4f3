// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Checkers: an authenticated gateway that lets registered clients create
//! and update GitHub check runs for organizations that installed the App.

pub mod api;
pub mod authz;
pub mod client_auth;
pub mod error;
pub mod installations;
pub mod routes;

#[cfg(test)]
mod test_support;

pub use api::{create_router, AppState};
pub use authz::InstallationResolver;
pub use client_auth::{verify_client_request, SignatureError, SignedRequest};
pub use error::{ErrorResponse, ServerError};
pub use installations::{InstallationCache, InstallationMap};
