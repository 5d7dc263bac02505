// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Numio settlement engine.

use thiserror::Error;

/// The primary error type used across all Numio crates.
///
/// Expected business-level outcomes ("no price for this combination",
/// "no SMS yet") are modeled as values, not errors; variants here mean a
/// call genuinely failed and the current sweep or request should give up.
#[derive(Debug, Error)]
pub enum NumioError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, constraint violation).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Number provider errors (transport failure, malformed response).
    #[error("provider error: {message}")]
    Provider {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Payment gateway errors (transport failure, rejected request).
    #[error("payment gateway error: {message}")]
    Gateway {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Notification channel errors (message delivery, invalid chat id).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Upstream cost fed to the price calculator was not positive.
    #[error("invalid upstream cost: {cost_usd}")]
    InvalidCost { cost_usd: f64 },

    /// Price calculation produced a zero or negative final amount.
    #[error("calculated price is not positive: {computed}")]
    NonPositivePrice { computed: i64 },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}
