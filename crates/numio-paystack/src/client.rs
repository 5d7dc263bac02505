// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Paystack REST API.
//!
//! Covers the two operations the settlement core consumes: initializing a
//! hosted transaction and verifying one by reference. Verification is the
//! authoritative source of truth during webhook reconciliation and
//! retries once on transient errors (429, 5xx); initialization is a
//! single attempt so a flaky gateway never produces two checkout pages
//! for one reference.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use tracing::{debug, info, warn};

use numio_core::NumioError;

/// Envelope every Paystack response arrives in.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    status: bool,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: Option<T>,
}

#[derive(Debug, Default, Deserialize)]
struct InitializeData {
    authorization_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct VerifyData {
    status: String,
    amount: i64,
}

/// Gateway-verified state of a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedTransaction {
    /// Gateway status string, e.g. "success", "failed", "abandoned".
    pub status: String,
    /// Amount actually paid, in kobo.
    pub amount_kobo: i64,
}

impl VerifiedTransaction {
    /// Returns true when the gateway reports the charge went through.
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// HTTP client for Paystack API communication.
#[derive(Debug, Clone)]
pub struct PaystackClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl PaystackClient {
    /// Creates a new Paystack client authenticated with `secret_key`.
    pub fn new(secret_key: &str, base_url: String) -> Result<Self, NumioError> {
        if secret_key.is_empty() {
            return Err(NumioError::Config(
                "paystack.secret_key is required for the payment gateway".into(),
            ));
        }

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {secret_key}")).map_err(|e| {
            NumioError::Config(format!("invalid paystack secret key header value: {e}"))
        })?;
        auth.set_sensitive(true);
        headers.insert("authorization", auth);
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| NumioError::Gateway {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries: 1,
        })
    }

    /// Initializes a hosted transaction and returns the checkout URL.
    ///
    /// The reference must be unique per attempt; Paystack rejects reuse.
    pub async fn initialize_transaction(
        &self,
        email: &str,
        amount_kobo: i64,
        reference: &str,
    ) -> Result<String, NumioError> {
        info!(reference, amount_kobo, "initializing paystack transaction");

        let payload = serde_json::json!({
            "email": email,
            "amount": amount_kobo,
            "reference": reference,
            "currency": "NGN",
        });

        let response = self
            .client
            .post(format!("{}/transaction/initialize", self.base_url))
            .json(&payload)
            .send()
            .await
            .map_err(|e| NumioError::Gateway {
                message: format!("initialize request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        debug!(status = %status, "initialize response received");

        if !status.is_success() {
            return Err(NumioError::Gateway {
                message: format!("initialize returned HTTP {status}: {body}"),
                source: None,
            });
        }

        let parsed: ApiResponse<InitializeData> =
            serde_json::from_str(&body).map_err(|e| NumioError::Gateway {
                message: format!("failed to parse initialize response: {e}"),
                source: Some(Box::new(e)),
            })?;

        match (parsed.status, parsed.data) {
            (true, Some(data)) => Ok(data.authorization_url),
            _ => Err(NumioError::Gateway {
                message: format!(
                    "initialize rejected: {}",
                    parsed.message.unwrap_or_else(|| "no message".into())
                ),
                source: None,
            }),
        }
    }

    /// Verifies a transaction by reference against the gateway.
    ///
    /// Retries once after a 1-second delay on transient errors.
    pub async fn verify_transaction(
        &self,
        reference: &str,
    ) -> Result<VerifiedTransaction, NumioError> {
        info!(reference, "verifying paystack transaction");

        let url = format!("{}/transaction/verify/{reference}", self.base_url);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, reference, "retrying verification after transient error");
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response =
                self.client
                    .get(&url)
                    .send()
                    .await
                    .map_err(|e| NumioError::Gateway {
                        message: format!("verify request failed: {e}"),
                        source: Some(Box::new(e)),
                    })?;

            let status = response.status();
            debug!(status = %status, attempt, "verify response received");

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(NumioError::Gateway {
                    message: format!("verify returned {status}: {body}"),
                    source: None,
                });
                continue;
            }

            let body = response.text().await.unwrap_or_default();
            if !status.is_success() {
                return Err(NumioError::Gateway {
                    message: format!("verify returned HTTP {status}: {body}"),
                    source: None,
                });
            }

            let parsed: ApiResponse<VerifyData> =
                serde_json::from_str(&body).map_err(|e| NumioError::Gateway {
                    message: format!("failed to parse verify response: {e}"),
                    source: Some(Box::new(e)),
                })?;

            return match (parsed.status, parsed.data) {
                (true, Some(data)) => Ok(VerifiedTransaction {
                    status: data.status,
                    amount_kobo: data.amount,
                }),
                _ => Err(NumioError::Gateway {
                    message: format!(
                        "verify rejected: {}",
                        parsed.message.unwrap_or_else(|| "no message".into())
                    ),
                    source: None,
                }),
            };
        }

        Err(last_error.unwrap_or_else(|| NumioError::Gateway {
            message: "verification failed after retries".into(),
            source: None,
        }))
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503)
}
