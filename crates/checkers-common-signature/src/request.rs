// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Client request signatures.
//!
//! A client signs the request path (relative to the `/api` prefix, without
//! query string) and the decimal `Content-Length` header value, `0` when the
//! header is absent. Two schemes are supported:
//!
//! - [`SigningScheme::Legacy`]: `hex(sha256(path || content_length || secret))`.
//!   The secret is hashed in rather than used as a MAC key. Existing clients
//!   sign this way, so it stays the default.
//! - [`SigningScheme::HmacSha256`]: `hex(hmac_sha256(secret, path || content_length))`.
//!
//! Both produce 64 lowercase hex characters and are checked with
//! [`signatures_match`].

use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Length of a hex-encoded SHA-256 signature.
pub const SIGNATURE_HEX_LEN: usize = 64;

/// How client request signatures are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SigningScheme {
	#[default]
	Legacy,
	HmacSha256,
}

impl SigningScheme {
	pub fn as_str(&self) -> &'static str {
		match self {
			SigningScheme::Legacy => "legacy",
			SigningScheme::HmacSha256 => "hmac-sha256",
		}
	}
}

impl fmt::Display for SigningScheme {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown signing scheme '{0}', expected 'legacy' or 'hmac-sha256'")]
pub struct UnknownSchemeError(pub String);

impl FromStr for SigningScheme {
	type Err = UnknownSchemeError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"legacy" | "sha256" => Ok(SigningScheme::Legacy),
			"hmac-sha256" | "hmac" => Ok(SigningScheme::HmacSha256),
			other => Err(UnknownSchemeError(other.to_string())),
		}
	}
}

/// The parts of a request covered by its signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigningInput<'a> {
	pub path: &'a str,
	pub content_length: &'a str,
}

impl<'a> SigningInput<'a> {
	/// `content_length` is the raw header text; `None` signs as `"0"`.
	pub fn new(path: &'a str, content_length: Option<&'a str>) -> Self {
		Self {
			path,
			content_length: content_length.unwrap_or("0"),
		}
	}
}

/// Compute the hex signature a client holding `secret` would send.
pub fn compute_request_signature(
	scheme: SigningScheme,
	input: &SigningInput<'_>,
	secret: &[u8],
) -> String {
	match scheme {
		SigningScheme::Legacy => {
			let mut hasher = Sha256::new();
			hasher.update(input.path.as_bytes());
			hasher.update(input.content_length.as_bytes());
			hasher.update(secret);
			hex::encode(hasher.finalize())
		}
		SigningScheme::HmacSha256 => {
			let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC can take key of any size");
			mac.update(input.path.as_bytes());
			mac.update(input.content_length.as_bytes());
			hex::encode(mac.finalize().into_bytes())
		}
	}
}

/// Check a supplied signature against the one expected for `input`.
pub fn verify_request_signature(
	scheme: SigningScheme,
	input: &SigningInput<'_>,
	secret: &[u8],
	supplied: &str,
) -> bool {
	let expected = compute_request_signature(scheme, input, secret);
	signatures_match(&expected, supplied)
}

/// Constant-time comparison of an expected and a supplied signature.
///
/// The expected length is fixed and public, so a supplied value of any other
/// length is rejected before comparing. Equal-length inputs are compared
/// with `subtle`, whose cost does not depend on where the first differing
/// byte is.
pub fn signatures_match(expected: &str, supplied: &str) -> bool {
	let expected = expected.as_bytes();
	let supplied = supplied.as_bytes();

	if supplied.len() != expected.len() {
		return false;
	}

	expected.ct_eq(supplied).into()
}
