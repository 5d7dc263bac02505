// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as positive rates, non-empty paths, and a well-formed
//! webhook path.

use crate::diagnostic::ConfigError;
use crate::model::NumioConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &NumioConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.webhook.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "webhook.host must not be empty".to_string(),
        });
    } else {
        let addr = config.webhook.host.trim();
        let is_valid_ip = addr.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = addr
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            errors.push(ConfigError::Validation {
                message: format!("webhook.host `{addr}` is not a valid IP address or hostname"),
            });
        }
    }

    if !config.webhook.path.starts_with('/') {
        errors.push(ConfigError::Validation {
            message: format!(
                "webhook.path must start with `/`, got `{}`",
                config.webhook.path
            ),
        });
    }

    if config.pricing.fx_rate_cap <= 0.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "pricing.fx_rate_cap must be positive, got {}",
                config.pricing.fx_rate_cap
            ),
        });
    }

    if config.pricing.fx_rate_fallback <= 0.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "pricing.fx_rate_fallback must be positive, got {}",
                config.pricing.fx_rate_fallback
            ),
        });
    }

    if config.pricing.rounding_increment <= 0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "pricing.rounding_increment must be positive, got {}",
                config.pricing.rounding_increment
            ),
        });
    }

    if config.pricing.rental_daily_rate_usd <= 0.0 {
        errors.push(ConfigError::Validation {
            message: format!(
                "pricing.rental_daily_rate_usd must be positive, got {}",
                config.pricing.rental_daily_rate_usd
            ),
        });
    }

    if config.workers.sms_poll_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "workers.sms_poll_interval_secs must be at least 1".to_string(),
        });
    }

    if config.workers.rental_poll_interval_secs == 0 {
        errors.push(ConfigError::Validation {
            message: "workers.rental_poll_interval_secs must be at least 1".to_string(),
        });
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
