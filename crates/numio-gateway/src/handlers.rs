// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the webhook listener.
//!
//! Status mapping: trust failures answer 4xx so the gateway stops
//! retrying deliveries that can never succeed; settled, ignored, and
//! duplicate deliveries all answer 200; internal failures answer 500 and
//! rely on the reconciler's idempotency to make the gateway's retry safe.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use numio_paystack::SIGNATURE_HEADER;
use numio_settlement::{RejectReason, WebhookDisposition};

use crate::server::WebhookState;

/// Acknowledgement body for accepted deliveries.
#[derive(Debug, Serialize)]
pub struct AckResponse {
    /// "processed" or "ignored".
    pub status: &'static str,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: &'static str,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status string.
    pub status: String,
    /// Binary version.
    pub version: String,
    /// Uptime in seconds.
    pub uptime_secs: u64,
}

/// POST handler for the configured webhook path.
///
/// Reads the raw body and the signature header and defers everything
/// else to the reconciler.
pub async fn post_webhook(
    State(state): State<WebhookState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    match state.reconciler.handle_event(&body, signature).await {
        Ok(WebhookDisposition::Processed) => {
            (StatusCode::OK, Json(AckResponse { status: "processed" })).into_response()
        }
        Ok(WebhookDisposition::Ignored) => {
            (StatusCode::OK, Json(AckResponse { status: "ignored" })).into_response()
        }
        Ok(WebhookDisposition::Rejected(RejectReason::InvalidSignature)) => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "invalid signature",
            }),
        )
            .into_response(),
        Ok(WebhookDisposition::Rejected(RejectReason::UnknownReference)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "unknown reference",
            }),
        )
            .into_response(),
        Ok(WebhookDisposition::Rejected(RejectReason::MalformedPayload)) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "malformed payload",
            }),
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "webhook processing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "internal error",
                }),
            )
                .into_response()
        }
    }
}

/// GET /health
pub async fn get_health(State(state): State<WebhookState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_response_serializes() {
        let json = serde_json::to_string(&AckResponse { status: "processed" }).unwrap();
        assert_eq!(json, r#"{"status":"processed"}"#);
    }

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
            uptime_secs: 42,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"uptime_secs\":42"));
    }
}
