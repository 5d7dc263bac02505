// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP-level tests for the webhook route's status mapping.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;
use wiremock::MockServer;

use numio_config::model::PricingConfig;
use numio_core::{NotificationSink, NotifyAction, NumioError};
use numio_gateway::{ServerConfig, WebhookState, build_router};
use numio_paystack::{PaystackClient, SIGNATURE_HEADER, webhook};
use numio_pva::PvaClient;
use numio_settlement::WebhookReconciler;
use numio_storage::Database;

const SECRET: &str = "sk_test_secret";

struct NullSink;

#[async_trait]
impl NotificationSink for NullSink {
    async fn notify(
        &self,
        _chat_id: i64,
        _text: &str,
        _action: Option<NotifyAction>,
    ) -> Result<(), NumioError> {
        Ok(())
    }
}

async fn test_app() -> (axum::Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("gateway.db");
    let db = Arc::new(Database::open(db_path.to_str().unwrap(), true).await.unwrap());

    let paystack_server = MockServer::start().await;
    let pva_server = MockServer::start().await;

    let reconciler = Arc::new(WebhookReconciler::new(
        db,
        Arc::new(PaystackClient::new(SECRET, paystack_server.uri()).unwrap()),
        Arc::new(PvaClient::new("pva-key".into(), pva_server.uri()).unwrap()),
        Arc::new(NullSink),
        SECRET.to_string(),
        PricingConfig::default(),
    ));

    let config = ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        path: "/webhook/paystack".into(),
    };
    let state = WebhookState {
        reconciler,
        start_time: std::time::Instant::now(),
    };
    (build_router(&config, state), dir)
}

fn webhook_request(body: &str, signature: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhook/paystack")
        .header("content-type", "application/json");
    if let Some(sig) = signature {
        builder = builder.header(SIGNATURE_HEADER, sig);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn missing_signature_answers_401() {
    let (app, _dir) = test_app().await;
    let response = app
        .oneshot(webhook_request(r#"{"event":"charge.success","data":{}}"#, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bad_signature_answers_401() {
    let (app, _dir) = test_app().await;
    let response = app
        .oneshot(webhook_request(
            r#"{"event":"charge.success","data":{}}"#,
            Some("deadbeef"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_charge_event_answers_200() {
    let (app, _dir) = test_app().await;
    let body = r#"{"event":"transfer.success","data":{}}"#;
    let sig = webhook::sign(SECRET, body.as_bytes());
    let response = app.oneshot(webhook_request(body, Some(&sig))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_reference_answers_400() {
    let (app, _dir) = test_app().await;
    let body = r#"{"event":"charge.success","data":{"reference":"num-1-ghost"}}"#;
    let sig = webhook::sign(SECRET, body.as_bytes());
    let response = app.oneshot(webhook_request(body, Some(&sig))).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn health_answers_200() {
    let (app, _dir) = test_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
