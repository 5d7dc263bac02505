// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider HTTP client.
//!
//! Every operation is a GET with the API key in the `customer` query
//! parameter. Responses are plain text; see [`crate::protocol`] for how
//! bodies are classified.

use std::time::Duration;

use tracing::{debug, warn};

use numio_core::NumioError;

use crate::protocol;

/// Outcome of a provider call that can legitimately come back empty.
///
/// `Unavailable` is the expected "no such combination / nothing for you"
/// path and must stay cheap; transport and protocol failures are
/// `Err(NumioError::Provider)` instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Available(T),
    Unavailable,
}

/// Price metadata for a (service, country) combination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServicePrice {
    /// Upstream cost in USD.
    pub cost_usd: f64,
}

/// A freshly purchased number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchasedNumber {
    /// Provider-side activation identifier. For this API the number
    /// itself acts as the activation id.
    pub activation_id: String,
    /// The phone number in international format.
    pub phone_number: String,
}

/// Result of polling a number for SMS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmsPoll {
    /// A message body was returned.
    Received { text: String },
    /// No message yet; poll again next sweep.
    Waiting,
    /// The activation is dead (banned/cancelled); stop polling it.
    Terminal { status: String },
}

/// HTTP client for the provider API.
#[derive(Debug, Clone)]
pub struct PvaClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl PvaClient {
    /// Creates a new provider client.
    ///
    /// `base_url` has no trailing slash; endpoints are appended per call.
    pub fn new(api_key: String, base_url: String) -> Result<Self, NumioError> {
        if api_key.is_empty() {
            return Err(NumioError::Config(
                "provider.api_key is required for the number provider".into(),
            ));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| NumioError::Provider {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Performs a GET against `endpoint` and returns the raw body.
    async fn request(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<String, NumioError> {
        let url = format!("{}/{endpoint}", self.base_url);
        let mut query: Vec<(&str, &str)> = vec![("customer", self.api_key.as_str())];
        query.extend_from_slice(params);

        let response = self
            .client
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| NumioError::Provider {
                message: format!("request to {endpoint} failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NumioError::Provider {
                message: format!("{endpoint} returned HTTP {status}"),
                source: None,
            });
        }

        let body = response.text().await.map_err(|e| NumioError::Provider {
            message: format!("failed to read {endpoint} response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        debug!(endpoint, body = body.as_str(), "provider response");
        Ok(body)
    }

    /// Fetches the current USD cost for a (service, country) combination.
    pub async fn get_price(
        &self,
        service: &str,
        country: &str,
    ) -> Result<Fetched<ServicePrice>, NumioError> {
        let body = self
            .request("get_price.php", &[("app", service), ("country", country)])
            .await?;

        if protocol::is_error_body(&body) {
            return Ok(Fetched::Unavailable);
        }

        match protocol::parse_usd_price(&body) {
            Some(cost_usd) if cost_usd > 0.0 => Ok(Fetched::Available(ServicePrice { cost_usd })),
            _ => {
                warn!(service, country, body = body.as_str(), "unparseable price body");
                Ok(Fetched::Unavailable)
            }
        }
    }

    /// Purchases a number for `service` in `country`.
    ///
    /// `rent_days` switches the purchase to a rental of that length.
    pub async fn buy_number(
        &self,
        service: &str,
        country: &str,
        rent_days: Option<u32>,
    ) -> Result<Fetched<PurchasedNumber>, NumioError> {
        let days;
        let mut params: Vec<(&str, &str)> = vec![("app", service), ("country", country)];
        if let Some(d) = rent_days {
            days = d.to_string();
            params.push(("days", days.as_str()));
        }

        let body = self.request("get_number.php", &params).await?;

        if protocol::is_error_body(&body) {
            return Ok(Fetched::Unavailable);
        }

        match protocol::parse_phone_number(&body) {
            Some(number) => Ok(Fetched::Available(PurchasedNumber {
                activation_id: number.to_string(),
                phone_number: number.to_string(),
            })),
            None => Ok(Fetched::Unavailable),
        }
    }

    /// Extends an existing rental by `days`.
    pub async fn renew_number(
        &self,
        activation_id: &str,
        days: u32,
    ) -> Result<Fetched<()>, NumioError> {
        let days = days.to_string();
        let body = self
            .request(
                "renew_number.php",
                &[("number", activation_id), ("days", days.as_str())],
            )
            .await?;

        if protocol::is_error_body(&body) {
            return Ok(Fetched::Unavailable);
        }

        let lower = body.to_lowercase();
        if lower.contains("ok") || lower.contains("success") {
            Ok(Fetched::Available(()))
        } else {
            Ok(Fetched::Unavailable)
        }
    }

    /// Polls a number for SMS.
    ///
    /// `is_rent` selects the rental endpoint shape; the provider keys
    /// rentals by the same number but a different parameter set.
    pub async fn get_sms(
        &self,
        phone_number: &str,
        service: &str,
        country: &str,
        is_rent: bool,
    ) -> Result<SmsPoll, NumioError> {
        let mut params: Vec<(&str, &str)> = vec![
            ("number", phone_number),
            ("app", service),
            ("country", country),
        ];
        if is_rent {
            params.push(("rent", "1"));
        }

        let body = self.request("get_sms.php", &params).await?;

        if protocol::is_waiting_body(&body) {
            return Ok(SmsPoll::Waiting);
        }
        if let Some(status) = protocol::terminal_status(&body) {
            return Ok(SmsPoll::Terminal {
                status: status.to_string(),
            });
        }
        if protocol::is_error_body(&body) {
            // The activation no longer exists on the provider side.
            return Ok(SmsPoll::Terminal {
                status: "NOT_FOUND".to_string(),
            });
        }

        Ok(SmsPoll::Received {
            text: body.trim().to_string(),
        })
    }
}
