// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! `X-Hub-Signature-256` handling for App webhook deliveries.

use checkers_common_signature::{compute_hmac_sha256, verify_hmac_sha256};
use tracing::{debug, warn};

use crate::error::GithubAppError;

const PREFIX: &str = "sha256=";

/// Verify a delivery's `X-Hub-Signature-256` header (`sha256=<hex>`) against
/// the raw body.
pub fn verify_webhook_signature(
	secret: &str,
	signature_header: &str,
	body: &[u8],
) -> Result<(), GithubAppError> {
	let Some(signature) = signature_header.strip_prefix(PREFIX) else {
		warn!("Webhook signature header missing 'sha256=' prefix");
		return Err(GithubAppError::InvalidWebhookSignature);
	};

	if verify_hmac_sha256(secret.as_bytes(), body, signature) {
		debug!("Webhook signature verified");
		Ok(())
	} else {
		warn!("Webhook signature verification failed");
		Err(GithubAppError::InvalidWebhookSignature)
	}
}

/// Header value GitHub would send for `body`. Used by tests and tooling.
pub fn compute_webhook_signature(secret: &str, body: &[u8]) -> String {
	format!("{PREFIX}{}", compute_hmac_sha256(secret.as_bytes(), body))
}
