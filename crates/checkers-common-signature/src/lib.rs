// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Signature utilities for Checkers.
//!
//! - [`request`]: signing scheme used by gateway clients
//!   (`X-Request-Signature` over path and content length).
//! - [`webhook`]: HMAC-SHA256 helpers for GitHub's `X-Hub-Signature-256`.

pub mod request;
pub mod webhook;

pub use request::{
	compute_request_signature, signatures_match, verify_request_signature, SigningInput,
	SigningScheme, UnknownSchemeError, SIGNATURE_HEX_LEN,
};
pub use webhook::{compute_hmac_sha256, verify_hmac_sha256};
