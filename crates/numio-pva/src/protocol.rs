// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Response sniffing for the provider's plain-text protocol.
//!
//! The API returns HTTP 200 for business-level failures, so classification
//! happens on the body text. These helpers are the single place that
//! knowledge lives.

/// Phrase the provider returns while an SMS has not arrived yet.
const WAITING_PHRASE: &str = "you have not received any code yet";

/// Returns true when the body reports a business-level failure
/// ("not found", "error ...") rather than a payload.
pub fn is_error_body(body: &str) -> bool {
    let lower = body.to_lowercase();
    lower.contains("not found") || lower.contains("error")
}

/// Returns true when the body is the "no SMS yet" sentinel.
pub fn is_waiting_body(body: &str) -> bool {
    body.to_lowercase().contains(WAITING_PHRASE)
}

/// Detects a terminal activation status reported in the body.
///
/// Returns the normalized status name when the provider says the
/// activation is dead (banned or cancelled) and polling should stop.
pub fn terminal_status(body: &str) -> Option<&'static str> {
    let lower = body.to_lowercase();
    if lower.contains("banned") {
        Some("BANNED")
    } else if lower.contains("cancel") {
        Some("CANCELED")
    } else {
        None
    }
}

/// Extracts a phone number from a purchase response.
///
/// The API returns just the number; anything not shaped like one means
/// the purchase did not happen.
pub fn parse_phone_number(body: &str) -> Option<&str> {
    let trimmed = body.trim();
    if trimmed.starts_with('+') && trimmed.len() > 5 {
        Some(trimmed)
    } else {
        None
    }
}

/// Parses a USD price from a price-lookup response.
pub fn parse_usd_price(body: &str) -> Option<f64> {
    body.trim().trim_start_matches('$').parse::<f64>().ok()
}
