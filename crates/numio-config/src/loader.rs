// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./numio.toml` > `~/.config/numio/numio.toml` > `/etc/numio/numio.toml`
//! with environment variable overrides via `NUMIO_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::NumioConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/numio/numio.toml` (system-wide)
/// 3. `~/.config/numio/numio.toml` (user XDG config)
/// 4. `./numio.toml` (local directory)
/// 5. `NUMIO_*` environment variables
pub fn load_config() -> Result<NumioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NumioConfig::default()))
        .merge(Toml::file("/etc/numio/numio.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("numio/numio.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("numio.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a specific TOML string only (no XDG lookup).
///
/// Used for testing and for pointing at an explicit config file.
pub fn load_config_from_str(toml_content: &str) -> Result<NumioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NumioConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<NumioConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(NumioConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// CRITICAL: Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names. For example, `NUMIO_PAYSTACK_SECRET_KEY` must
/// map to `paystack.secret_key`, not `paystack.secret.key`.
fn env_provider() -> Env {
    Env::prefixed("NUMIO_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        // Example: NUMIO_PAYSTACK_SECRET_KEY -> "paystack_secret_key"
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("service_", "service.", 1)
            .replacen("bot_", "bot.", 1)
            .replacen("provider_", "provider.", 1)
            .replacen("paystack_", "paystack.", 1)
            .replacen("storage_", "storage.", 1)
            .replacen("pricing_", "pricing.", 1)
            .replacen("workers_", "workers.", 1)
            .replacen("webhook_", "webhook.", 1);
        mapped.into()
    })
}
