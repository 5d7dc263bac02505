// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for config loading and validation.

use numio_config::load_and_validate_str;

#[test]
fn empty_config_uses_defaults() {
    let config = load_and_validate_str("").expect("empty config should be valid");
    assert_eq!(config.service.log_level, "info");
    assert_eq!(config.paystack.base_url, "https://api.paystack.co");
    assert_eq!(config.webhook.path, "/webhook/paystack");
}

#[test]
fn sections_override_defaults() {
    let toml = r#"
[pricing]
markup_pct = 50
fx_rate_cap = 1500.0

[workers]
sms_poll_interval_secs = 30

[webhook]
port = 9000
"#;
    let config = load_and_validate_str(toml).expect("config should be valid");
    assert_eq!(config.pricing.markup_pct, 50);
    assert_eq!(config.pricing.fx_rate_cap, 1500.0);
    assert_eq!(config.workers.sms_poll_interval_secs, 30);
    assert_eq!(config.webhook.port, 9000);
    // Untouched sections keep defaults.
    assert_eq!(config.pricing.rounding_increment, 10);
}

#[test]
fn unknown_key_is_a_diagnostic_not_a_panic() {
    let errors = load_and_validate_str("[bot]\ntokne = \"x\"\n").unwrap_err();
    assert!(!errors.is_empty());
}

#[test]
fn semantic_validation_runs_after_parse() {
    let errors = load_and_validate_str("[pricing]\nrounding_increment = 0\n").unwrap_err();
    let rendered = errors.iter().map(|e| e.to_string()).collect::<String>();
    assert!(rendered.contains("rounding_increment"));
}

#[test]
fn secrets_can_be_set_inline() {
    let toml = r#"
[bot]
token = "123456:ABC"

[paystack]
secret_key = "sk_test_abc"

[provider]
api_key = "pva_key"
"#;
    let config = load_and_validate_str(toml).expect("config should be valid");
    assert_eq!(config.bot.token.as_deref(), Some("123456:ABC"));
    assert_eq!(config.paystack.secret_key.as_deref(), Some("sk_test_abc"));
    assert_eq!(config.provider.api_key.as_deref(), Some("pva_key"));
}
