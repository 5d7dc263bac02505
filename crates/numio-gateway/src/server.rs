// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook HTTP server built on axum.

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio_util::sync::CancellationToken;

use numio_core::NumioError;
use numio_settlement::WebhookReconciler;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct WebhookState {
    /// The reconciler every delivery is handed to.
    pub reconciler: Arc<WebhookReconciler>,
    /// Process start time for uptime reporting.
    pub start_time: std::time::Instant,
}

/// Webhook server configuration (mirrors WebhookConfig from numio-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Path the gateway delivers events to.
    pub path: String,
}

/// Builds the router: the webhook POST route plus GET /health.
pub fn build_router(config: &ServerConfig, state: WebhookState) -> Router {
    Router::new()
        .route(&config.path, post(handlers::post_webhook))
        .route("/health", get(handlers::get_health))
        .with_state(state)
}

/// Starts the webhook server and serves until `cancel` fires.
pub async fn start_server(
    config: &ServerConfig,
    state: WebhookState,
    cancel: CancellationToken,
) -> Result<(), NumioError> {
    let app = build_router(config, state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| NumioError::Gateway {
            message: format!("failed to bind webhook listener to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!(addr = addr.as_str(), path = config.path.as_str(), "webhook listener started");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| NumioError::Gateway {
            message: format!("webhook server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
