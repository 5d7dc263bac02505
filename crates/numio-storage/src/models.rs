// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Row types for storage entities.
//!
//! Timestamps are RFC 3339 UTC strings with fixed millisecond precision so
//! that lexicographic order equals chronological order, both in SQL
//! comparisons and in Rust.

use chrono::{DateTime, Utc};

use numio_core::{NumberStatus, PaymentStatus};

/// A bot user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub telegram_id: i64,
    pub full_name: Option<String>,
    pub username: Option<String>,
    pub language_code: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A payment attempt in the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payment {
    pub id: i64,
    pub user_id: i64,
    /// Amount in kobo (minor NGN unit).
    pub amount_kobo: i64,
    pub status: PaymentStatus,
    /// Unique, immutable gateway reference.
    pub paystack_ref: String,
    /// Serialized quote key locked at creation time.
    pub locked_quote_key: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A provisioned phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Number {
    pub id: i64,
    pub phone_number: String,
    /// Provider-side activation identifier, unique.
    pub activation_id: String,
    pub service_code: String,
    pub country_code: String,
    pub status: NumberStatus,
    pub is_rent: bool,
    pub renewal_notice_sent: bool,
    /// RFC 3339 UTC expiry; only ever extends.
    pub expires_at: String,
    pub user_id: i64,
    pub payment_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Fields for inserting a new number.
#[derive(Debug, Clone)]
pub struct NewNumber {
    pub phone_number: String,
    pub activation_id: String,
    pub service_code: String,
    pub country_code: String,
    pub is_rent: bool,
    pub expires_at: String,
    pub user_id: i64,
    pub payment_id: i64,
}

/// A received SMS message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsMessage {
    pub id: i64,
    pub number_id: i64,
    /// Stable provider-side message identifier, unique.
    pub provider_sms_id: String,
    pub full_text: String,
    pub verification_code: Option<String>,
    pub created_at: String,
}

/// A number joined with its owner's chat id, as the workers consume it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberWithOwner {
    pub number: Number,
    pub telegram_id: i64,
}

/// Fixed timestamp format matching the SQL defaults
/// (`strftime('%Y-%m-%dT%H:%M:%fZ', 'now')`).
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Formats a UTC instant in the storage timestamp format.
pub fn format_timestamp(dt: DateTime<Utc>) -> String {
    dt.format(TIMESTAMP_FORMAT).to_string()
}

/// The current time in the storage timestamp format.
pub fn now_timestamp() -> String {
    format_timestamp(Utc::now())
}
