// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Numio settlement engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Numio configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values;
/// secrets (bot token, API keys) have no defaults and must be supplied.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct NumioConfig {
    /// Process-level settings.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Telegram bot settings (notification channel).
    #[serde(default)]
    pub bot: BotConfig,

    /// Number provider API settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Paystack payment gateway settings.
    #[serde(default)]
    pub paystack: PaystackConfig,

    /// SQLite storage settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Pricing engine rules and cache lifetimes.
    #[serde(default)]
    pub pricing: PricingConfig,

    /// Background worker intervals.
    #[serde(default)]
    pub workers: WorkerConfig,

    /// Webhook HTTP listener settings.
    #[serde(default)]
    pub webhook: WebhookConfig,
}

/// Process-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Telegram bot configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Telegram Bot API token. Required at startup; `None` is a fatal error.
    #[serde(default)]
    pub token: Option<String>,
}

/// Number provider (PVA) API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Provider API key, sent as the `customer` query parameter.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the provider API.
    #[serde(default = "default_provider_base_url")]
    pub base_url: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_provider_base_url(),
        }
    }
}

fn default_provider_base_url() -> String {
    "https://api.pvapins.com/user/api".to_string()
}

/// Paystack payment gateway configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PaystackConfig {
    /// Paystack secret key. Also the HMAC secret for webhook signatures.
    #[serde(default)]
    pub secret_key: Option<String>,

    /// Base URL of the Paystack API.
    #[serde(default = "default_paystack_base_url")]
    pub base_url: String,
}

impl Default for PaystackConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            base_url: default_paystack_base_url(),
        }
    }
}

fn default_paystack_base_url() -> String {
    "https://api.paystack.co".to_string()
}

/// SQLite storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("numio").join("numio.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("numio.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Pricing engine rules and cache lifetimes.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PricingConfig {
    /// Internal markup percentage. 100 means 2x the upstream price.
    #[serde(default = "default_markup_pct")]
    pub markup_pct: u32,

    /// Ceiling on the USD to NGN rate used for conversion. A safety cap
    /// against FX spikes or a manipulated upstream rate.
    #[serde(default = "default_fx_rate_cap")]
    pub fx_rate_cap: f64,

    /// Rate used by the static FX source until a live feed is wired in.
    #[serde(default = "default_fx_rate_fallback")]
    pub fx_rate_fallback: f64,

    /// Final NGN prices are rounded up to a multiple of this.
    #[serde(default = "default_rounding_increment")]
    pub rounding_increment: i64,

    /// Quote cache TTL in seconds.
    #[serde(default = "default_quote_ttl_secs")]
    pub quote_ttl_secs: u64,

    /// Price lock TTL in seconds.
    #[serde(default = "default_lock_ttl_secs")]
    pub lock_ttl_secs: u64,

    /// Rental base rate in USD per day. The provider API has no rental
    /// price endpoint, so this is configuration.
    #[serde(default = "default_rental_daily_rate_usd")]
    pub rental_daily_rate_usd: f64,

    /// Active duration of a temporary number in minutes. The provider API
    /// reports no duration metadata, so this is configuration.
    #[serde(default = "default_temp_duration_minutes")]
    pub temp_duration_minutes: u32,

    /// Length in days of a rental renewal purchased from the expiry
    /// warning.
    #[serde(default = "default_rental_renewal_days")]
    pub rental_renewal_days: u32,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            markup_pct: default_markup_pct(),
            fx_rate_cap: default_fx_rate_cap(),
            fx_rate_fallback: default_fx_rate_fallback(),
            rounding_increment: default_rounding_increment(),
            quote_ttl_secs: default_quote_ttl_secs(),
            lock_ttl_secs: default_lock_ttl_secs(),
            rental_daily_rate_usd: default_rental_daily_rate_usd(),
            temp_duration_minutes: default_temp_duration_minutes(),
            rental_renewal_days: default_rental_renewal_days(),
        }
    }
}

fn default_markup_pct() -> u32 {
    100
}

fn default_fx_rate_cap() -> f64 {
    1600.0
}

fn default_fx_rate_fallback() -> f64 {
    1550.75
}

fn default_rounding_increment() -> i64 {
    10
}

fn default_quote_ttl_secs() -> u64 {
    3600
}

fn default_lock_ttl_secs() -> u64 {
    900
}

fn default_rental_daily_rate_usd() -> f64 {
    0.50
}

fn default_temp_duration_minutes() -> u32 {
    15
}

fn default_rental_renewal_days() -> u32 {
    30
}

/// Background worker intervals and windows.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WorkerConfig {
    /// SMS polling interval in seconds.
    #[serde(default = "default_sms_poll_interval_secs")]
    pub sms_poll_interval_secs: u64,

    /// Rental status sweep interval in seconds.
    #[serde(default = "default_rental_poll_interval_secs")]
    pub rental_poll_interval_secs: u64,

    /// Days before rental expiry at which the renewal warning is sent.
    #[serde(default = "default_renewal_warning_days")]
    pub renewal_warning_days: u32,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            sms_poll_interval_secs: default_sms_poll_interval_secs(),
            rental_poll_interval_secs: default_rental_poll_interval_secs(),
            renewal_warning_days: default_renewal_warning_days(),
        }
    }
}

fn default_sms_poll_interval_secs() -> u64 {
    15
}

fn default_rental_poll_interval_secs() -> u64 {
    3600
}

fn default_renewal_warning_days() -> u32 {
    3
}

/// Webhook HTTP listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WebhookConfig {
    /// Host address to bind.
    #[serde(default = "default_webhook_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_webhook_port")]
    pub port: u16,

    /// Path the payment gateway delivers events to.
    #[serde(default = "default_webhook_path")]
    pub path: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            host: default_webhook_host(),
            port: default_webhook_port(),
            path: default_webhook_path(),
        }
    }
}

fn default_webhook_host() -> String {
    "127.0.0.1".to_string()
}

fn default_webhook_port() -> u16 {
    8090
}

fn default_webhook_path() -> String {
    "/webhook/paystack".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_observed_behavior() {
        let config = NumioConfig::default();
        assert_eq!(config.pricing.markup_pct, 100);
        assert_eq!(config.pricing.fx_rate_cap, 1600.0);
        assert_eq!(config.pricing.rounding_increment, 10);
        assert_eq!(config.pricing.quote_ttl_secs, 3600);
        assert_eq!(config.pricing.lock_ttl_secs, 900);
        assert_eq!(config.workers.sms_poll_interval_secs, 15);
        assert_eq!(config.workers.rental_poll_interval_secs, 3600);
        assert_eq!(config.workers.renewal_warning_days, 3);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let toml_str = r#"
[pricing]
markup_percent = 50
"#;
        let result = toml::from_str::<NumioConfig>(toml_str);
        assert!(result.is_err());
    }

    #[test]
    fn secrets_default_to_none() {
        let config = NumioConfig::default();
        assert!(config.bot.token.is_none());
        assert!(config.provider.api_key.is_none());
        assert!(config.paystack.secret_key.is_none());
    }
}
