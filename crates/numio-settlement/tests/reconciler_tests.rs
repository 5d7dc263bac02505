// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end reconciliation tests against a real SQLite file and mocked
//! gateway/provider HTTP endpoints.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use numio_config::model::PricingConfig;
use numio_core::{NotificationSink, NotifyAction, NumioError, PaymentStatus};
use numio_paystack::{PaystackClient, webhook};
use numio_pva::PvaClient;
use numio_settlement::{RejectReason, WebhookDisposition, WebhookReconciler};
use numio_storage::Database;
use numio_storage::queries::{numbers, payments, users};

const SECRET: &str = "sk_test_secret";

/// Notification sink that records every delivery.
#[derive(Default)]
struct RecordingSink {
    sent: Mutex<Vec<(i64, String, Option<NotifyAction>)>>,
}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify(
        &self,
        chat_id: i64,
        text: &str,
        action: Option<NotifyAction>,
    ) -> Result<(), NumioError> {
        self.sent.lock().await.push((chat_id, text.to_string(), action));
        Ok(())
    }
}

struct Harness {
    db: Arc<Database>,
    reconciler: WebhookReconciler,
    sink: Arc<RecordingSink>,
    paystack_server: MockServer,
    pva_server: MockServer,
    _dir: tempfile::TempDir,
}

async fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("settlement.db");
    let db = Arc::new(Database::open(db_path.to_str().unwrap(), true).await.unwrap());

    let paystack_server = MockServer::start().await;
    let pva_server = MockServer::start().await;

    let paystack = Arc::new(PaystackClient::new(SECRET, paystack_server.uri()).unwrap());
    let provider = Arc::new(PvaClient::new("pva-key".into(), pva_server.uri()).unwrap());
    let sink = Arc::new(RecordingSink::default());

    let reconciler = WebhookReconciler::new(
        db.clone(),
        paystack,
        provider,
        sink.clone(),
        SECRET.to_string(),
        PricingConfig::default(),
    );

    Harness {
        db,
        reconciler,
        sink,
        paystack_server,
        pva_server,
        _dir: dir,
    }
}

fn signed_event(reference: &str) -> (Vec<u8>, String) {
    let body = serde_json::json!({
        "event": "charge.success",
        "data": { "reference": reference, "amount": 160_000, "status": "success" }
    })
    .to_string()
    .into_bytes();
    let sig = webhook::sign(SECRET, &body);
    (body, sig)
}

async fn seed_payment(h: &Harness, reference: &str, quote_key: &str) -> (i64, i64) {
    let user = users::upsert_user(&h.db, 9000, Some("Test User"), None).await.unwrap();
    let payment = payments::insert_payment(&h.db, user.id, 160_000, reference, quote_key)
        .await
        .unwrap();
    (user.id, payment.id)
}

async fn mount_verify_success(h: &Harness, reference: &str, amount: i64) {
    Mock::given(method("GET"))
        .and(path(format!("/transaction/verify/{reference}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": true,
            "data": { "status": "success", "amount": amount }
        })))
        .mount(&h.paystack_server)
        .await;
}

async fn mount_buy_number(h: &Harness, phone: &str) {
    Mock::given(method("GET"))
        .and(path("/get_number.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(phone))
        .mount(&h.pva_server)
        .await;
}

#[tokio::test]
async fn invalid_signature_is_rejected_before_anything_else() {
    let h = harness().await;
    let (body, _) = signed_event("num-1-x");

    let result = h
        .reconciler
        .handle_event(&body, Some("deadbeef"))
        .await
        .unwrap();
    assert_eq!(
        result,
        WebhookDisposition::Rejected(RejectReason::InvalidSignature)
    );

    let missing = h.reconciler.handle_event(&body, None).await.unwrap();
    assert_eq!(
        missing,
        WebhookDisposition::Rejected(RejectReason::InvalidSignature)
    );
}

#[tokio::test]
async fn non_charge_events_are_acknowledged_without_action() {
    let h = harness().await;
    let body = serde_json::json!({
        "event": "transfer.success",
        "data": { "reference": "num-1-x" }
    })
    .to_string()
    .into_bytes();
    let sig = webhook::sign(SECRET, &body);

    let result = h.reconciler.handle_event(&body, Some(&sig)).await.unwrap();
    assert_eq!(result, WebhookDisposition::Ignored);
}

#[tokio::test]
async fn unknown_reference_is_rejected_with_no_side_effects() {
    let h = harness().await;
    let (body, sig) = signed_event("num-1-ghost");

    let result = h.reconciler.handle_event(&body, Some(&sig)).await.unwrap();
    assert_eq!(
        result,
        WebhookDisposition::Rejected(RejectReason::UnknownReference)
    );

    // No payment row was fabricated.
    assert!(
        payments::get_payment_by_reference(&h.db, "num-1-ghost")
            .await
            .unwrap()
            .is_none()
    );
    assert!(h.sink.sent.lock().await.is_empty());
}

#[tokio::test]
async fn happy_path_provisions_a_temporary_number() {
    let h = harness().await;
    let (_user_id, payment_id) =
        seed_payment(&h, "num-1-happy", "quote:Nigeria:WhatsApp:temp").await;
    mount_verify_success(&h, "num-1-happy", 160_000).await;
    mount_buy_number(&h, "+2348012345678").await;

    let (body, sig) = signed_event("num-1-happy");
    let result = h.reconciler.handle_event(&body, Some(&sig)).await.unwrap();
    assert_eq!(result, WebhookDisposition::Processed);

    let payment = payments::get_payment(&h.db, payment_id).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Successful);

    let number = numbers::get_number(&h.db, 1).await.unwrap().unwrap();
    assert_eq!(number.phone_number, "+2348012345678");
    assert_eq!(number.payment_id, payment_id);
    assert!(!number.is_rent);

    let sent = h.sink.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, 9000);
    assert!(sent[0].1.contains("+2348012345678"));
    assert!(matches!(
        sent[0].2,
        Some(NotifyAction::RefreshSms { number_id: 1 })
    ));
}

#[tokio::test]
async fn duplicate_delivery_is_a_no_op_returning_success() {
    let h = harness().await;
    seed_payment(&h, "num-1-dup", "quote:Nigeria:WhatsApp:temp").await;
    mount_verify_success(&h, "num-1-dup", 160_000).await;
    mount_buy_number(&h, "+2348099999999").await;

    let (body, sig) = signed_event("num-1-dup");
    let first = h.reconciler.handle_event(&body, Some(&sig)).await.unwrap();
    let second = h.reconciler.handle_event(&body, Some(&sig)).await.unwrap();
    assert_eq!(first, WebhookDisposition::Processed);
    assert_eq!(second, WebhookDisposition::Processed);

    // Exactly one number provisioned and one notification delivered.
    assert!(numbers::get_number(&h.db, 1).await.unwrap().is_some());
    assert!(numbers::get_number(&h.db, 2).await.unwrap().is_none());
    assert_eq!(h.sink.sent.lock().await.len(), 1);
}

#[tokio::test]
async fn concurrent_deliveries_provision_exactly_once() {
    let h = harness().await;
    seed_payment(&h, "num-1-race", "quote:Nigeria:WhatsApp:temp").await;
    mount_verify_success(&h, "num-1-race", 160_000).await;
    mount_buy_number(&h, "+2348077777777").await;

    let (body, sig) = signed_event("num-1-race");
    let (a, b) = tokio::join!(
        h.reconciler.handle_event(&body, Some(&sig)),
        h.reconciler.handle_event(&body, Some(&sig)),
    );
    assert_eq!(a.unwrap(), WebhookDisposition::Processed);
    assert_eq!(b.unwrap(), WebhookDisposition::Processed);

    assert!(numbers::get_number(&h.db, 1).await.unwrap().is_some());
    assert!(
        numbers::get_number(&h.db, 2).await.unwrap().is_none(),
        "the losing delivery must not provision a second number"
    );
    assert_eq!(h.sink.sent.lock().await.len(), 1);
}

#[tokio::test]
async fn amount_mismatch_disputes_and_never_provisions() {
    let h = harness().await;
    let (_, payment_id) = seed_payment(&h, "num-1-short", "quote:Nigeria:WhatsApp:temp").await;
    // Gateway verified a smaller amount than the ledger recorded.
    mount_verify_success(&h, "num-1-short", 100_000).await;

    let (body, sig) = signed_event("num-1-short");
    let result = h.reconciler.handle_event(&body, Some(&sig)).await.unwrap();
    assert_eq!(result, WebhookDisposition::Processed);

    let payment = payments::get_payment(&h.db, payment_id).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Disputed);
    assert!(numbers::get_number(&h.db, 1).await.unwrap().is_none());
}

#[tokio::test]
async fn failed_verification_marks_payment_failed() {
    let h = harness().await;
    let (_, payment_id) = seed_payment(&h, "num-1-nope", "quote:Nigeria:WhatsApp:temp").await;
    Mock::given(method("GET"))
        .and(path("/transaction/verify/num-1-nope"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": true,
            "data": { "status": "abandoned", "amount": 160_000 }
        })))
        .mount(&h.paystack_server)
        .await;

    let (body, sig) = signed_event("num-1-nope");
    let result = h.reconciler.handle_event(&body, Some(&sig)).await.unwrap();
    assert_eq!(result, WebhookDisposition::Processed);

    let payment = payments::get_payment(&h.db, payment_id).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Failed);
    assert!(numbers::get_number(&h.db, 1).await.unwrap().is_none());
}

#[tokio::test]
async fn provisioning_failure_keeps_payment_successful_and_notifies_support() {
    let h = harness().await;
    let (_, payment_id) = seed_payment(&h, "num-1-empty", "quote:UK:Google:temp").await;
    mount_verify_success(&h, "num-1-empty", 160_000).await;
    Mock::given(method("GET"))
        .and(path("/get_number.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("No numbers available"))
        .mount(&h.pva_server)
        .await;

    let (body, sig) = signed_event("num-1-empty");
    let result = h.reconciler.handle_event(&body, Some(&sig)).await.unwrap();
    assert_eq!(result, WebhookDisposition::Processed);

    // Money moved: payment stays successful even though nothing provisioned.
    let payment = payments::get_payment(&h.db, payment_id).await.unwrap().unwrap();
    assert_eq!(payment.status, PaymentStatus::Successful);
    assert!(numbers::get_number(&h.db, 1).await.unwrap().is_none());

    let sent = h.sink.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains("contact support"));
}

#[tokio::test]
async fn renewal_key_extends_the_rental_and_clears_notice() {
    let h = harness().await;

    // Seed an existing rental funded by an older payment.
    let user = users::upsert_user(&h.db, 9000, None, None).await.unwrap();
    let funding = payments::insert_payment(
        &h.db,
        user.id,
        320_000,
        "num-1-orig",
        "quote:Malaysia:Telegram:rent:7",
    )
    .await
    .unwrap();
    let rental = numbers::insert_number(
        &h.db,
        numio_storage::models::NewNumber {
            phone_number: "+60123456789".into(),
            activation_id: "+60123456789".into(),
            service_code: "Telegram".into(),
            country_code: "Malaysia".into(),
            is_rent: true,
            expires_at: numio_storage::models::now_timestamp(),
            user_id: user.id,
            payment_id: funding.id,
        },
    )
    .await
    .unwrap();
    numbers::set_renewal_notice_sent(&h.db, rental.id).await.unwrap();

    // The renewal payment locks a renewal-shaped quote key.
    let reference = "num-1-renew";
    payments::insert_payment(
        &h.db,
        user.id,
        160_000,
        reference,
        &format!("quote:renew:{}:30", rental.id),
    )
    .await
    .unwrap();
    mount_verify_success(&h, reference, 160_000).await;
    Mock::given(method("GET"))
        .and(path("/renew_number.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&h.pva_server)
        .await;

    let (body, sig) = signed_event(reference);
    let result = h.reconciler.handle_event(&body, Some(&sig)).await.unwrap();
    assert_eq!(result, WebhookDisposition::Processed);

    let renewed = numbers::get_number(&h.db, rental.id).await.unwrap().unwrap();
    assert!(renewed.expires_at > rental.expires_at, "expiry must extend");
    assert!(!renewed.renewal_notice_sent, "notice flag must reset");

    let sent = h.sink.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.contains("extended by 30 days"));
}
