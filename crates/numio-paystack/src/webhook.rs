// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook signature verification and event envelope.
//!
//! Paystack signs each delivery with HMAC-SHA512 over the raw request
//! body, keyed by the account's secret key, in the `x-paystack-signature`
//! header. Verification MUST run over the exact bytes received; parsing
//! and re-serializing the JSON first would break the MAC on any
//! formatting difference.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha512;

type HmacSha512 = Hmac<Sha512>;

/// Header carrying the hex-encoded HMAC of the request body.
pub const SIGNATURE_HEADER: &str = "x-paystack-signature";

/// Event type that triggers settlement processing.
pub const CHARGE_SUCCESS_EVENT: &str = "charge.success";

/// Parsed webhook event envelope.
///
/// Only the fields the reconciler needs; the body's amount and status are
/// deliberately ignored in favor of server-to-server verification.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    /// Event type, e.g. "charge.success".
    pub event: String,
    /// Event payload.
    pub data: WebhookData,
}

/// Payload of a webhook event.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookData {
    /// Transaction reference the event refers to.
    #[serde(default)]
    pub reference: Option<String>,
}

/// Verifies the webhook signature over the raw body bytes.
///
/// Comparison is constant-time via the `hmac` crate's verify.
pub fn verify_signature(secret: &str, raw_body: &[u8], signature_hex: &str) -> bool {
    let Ok(expected) = hex::decode(signature_hex) else {
        return false;
    };

    let mut mac = HmacSha512::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(raw_body);
    mac.verify_slice(&expected).is_ok()
}

/// Computes the hex signature for a body. Used by tests and tooling.
pub fn sign(secret: &str, raw_body: &[u8]) -> String {
    let mut mac = HmacSha512::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(raw_body);
    hex::encode(mac.finalize().into_bytes())
}
