// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Secret handling shared by the Checkers crates.
//!
//! Client signing secrets, the GitHub App private key, the webhook secret and
//! installation access tokens all travel inside [`Secret`], which never
//! prints its contents and zeroes its memory on drop. [`load_secret_env`]
//! reads such values from `VAR` or from the file named by `VAR_FILE`.

pub mod env;
mod secret;

pub use env::{load_secret_env, SecretEnvError};
pub use secret::{Secret, SecretString, REDACTED};
