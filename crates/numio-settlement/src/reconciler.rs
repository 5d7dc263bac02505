// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The webhook reconciler state machine.
//!
//! Reconciles a gateway event against the payment ledger and triggers
//! provisioning exactly once per payment. Delivery is at-least-once and
//! may race with itself; safety rests on three things, in order:
//! the already-successful short-circuit, the conditional
//! pending -> successful update (one winner), and the unique reference
//! constraint underneath it all.
//!
//! After the success commit, provisioning failures are an operational
//! incident, not a billing error: the money has moved, so the payment is
//! never reverted and the user is pointed at support instead.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{error, info, warn};

use numio_config::model::PricingConfig;
use numio_core::{NotificationSink, NotifyAction, NumberKind, NumioError, PaymentStatus};
use numio_paystack::{self as paystack_api, PaystackClient};
use numio_pricing::QuoteKey;
use numio_pva::{Fetched, PvaClient, catalog};
use numio_storage::models::{NewNumber, Payment, format_timestamp};
use numio_storage::queries::{numbers, payments, users};
use numio_storage::Database;

/// Why an event was rejected outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Signature header missing or not the HMAC of the raw body.
    InvalidSignature,
    /// The referenced payment does not exist in the ledger.
    UnknownReference,
    /// Signed but unparseable payload.
    MalformedPayload,
}

/// Outcome of handling one webhook delivery.
///
/// `Rejected` maps to a client error at the HTTP layer so the gateway
/// stops retrying a delivery that can never succeed; `Ignored` and
/// `Processed` both acknowledge with success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookDisposition {
    Rejected(RejectReason),
    Ignored,
    Processed,
}

/// Reconciles payment gateway events against internal state.
pub struct WebhookReconciler {
    db: Arc<Database>,
    paystack: Arc<PaystackClient>,
    provider: Arc<PvaClient>,
    notifier: Arc<dyn NotificationSink>,
    webhook_secret: String,
    pricing: PricingConfig,
}

impl WebhookReconciler {
    /// Creates a reconciler over the shared ledger and clients.
    ///
    /// `webhook_secret` is the Paystack secret key; deliveries are signed
    /// with it.
    pub fn new(
        db: Arc<Database>,
        paystack: Arc<PaystackClient>,
        provider: Arc<PvaClient>,
        notifier: Arc<dyn NotificationSink>,
        webhook_secret: String,
        pricing: PricingConfig,
    ) -> Self {
        Self {
            db,
            paystack,
            provider,
            notifier,
            webhook_secret,
            pricing,
        }
    }

    /// Handles one raw webhook delivery.
    ///
    /// `signature` is the value of the `x-paystack-signature` header.
    /// Errors returned here mean an unexpected internal failure; the HTTP
    /// layer answers 500 and the gateway retries, which steps 4 and 7
    /// make safe.
    pub async fn handle_event(
        &self,
        raw_body: &[u8],
        signature: Option<&str>,
    ) -> Result<WebhookDisposition, NumioError> {
        // 1. Authenticity, over the exact raw bytes, before any parsing.
        let Some(signature) = signature else {
            warn!("webhook delivery without signature header");
            return Ok(WebhookDisposition::Rejected(RejectReason::InvalidSignature));
        };
        if !paystack_api::verify_signature(&self.webhook_secret, raw_body, signature) {
            warn!("webhook signature mismatch");
            return Ok(WebhookDisposition::Rejected(RejectReason::InvalidSignature));
        }

        // 2. Event-type filter.
        let event: paystack_api::WebhookEvent = match serde_json::from_slice(raw_body) {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, "signed but unparseable webhook payload");
                return Ok(WebhookDisposition::Rejected(RejectReason::MalformedPayload));
            }
        };
        if event.event != paystack_api::CHARGE_SUCCESS_EVENT {
            info!(event = event.event.as_str(), "ignoring non-charge event");
            return Ok(WebhookDisposition::Ignored);
        }
        let Some(reference) = event.data.reference else {
            warn!("charge.success event without a reference");
            return Ok(WebhookDisposition::Rejected(RejectReason::MalformedPayload));
        };

        // 3. Ledger lookup. Unknown references are rejected, never created.
        let Some(payment) = payments::get_payment_by_reference(&self.db, &reference).await? else {
            warn!(reference = reference.as_str(), "webhook for unknown reference");
            return Ok(WebhookDisposition::Rejected(RejectReason::UnknownReference));
        };

        // 4. Idempotency short-circuit for at-least-once delivery.
        if payment.status != PaymentStatus::Pending {
            info!(
                payment_id = payment.id,
                status = %payment.status,
                "payment already settled; acknowledging without side effects"
            );
            return Ok(WebhookDisposition::Processed);
        }

        // 5. Server-to-server re-verification. The webhook body's own
        // amount/status are never trusted, even after the signature check.
        let verified = self.paystack.verify_transaction(&reference).await?;
        if !verified.is_success() {
            warn!(
                payment_id = payment.id,
                gateway_status = verified.status.as_str(),
                "verification did not confirm the charge"
            );
            payments::transition_from_pending(&self.db, payment.id, PaymentStatus::Failed).await?;
            return Ok(WebhookDisposition::Processed);
        }

        // 6. Amount cross-check.
        if verified.amount_kobo != payment.amount_kobo {
            error!(
                payment_id = payment.id,
                expected_kobo = payment.amount_kobo,
                paid_kobo = verified.amount_kobo,
                "amount mismatch; marking disputed for manual review"
            );
            payments::transition_from_pending(&self.db, payment.id, PaymentStatus::Disputed)
                .await?;
            return Ok(WebhookDisposition::Processed);
        }

        // 7. One-shot success commit. Losing the race means a concurrent
        // delivery already owns provisioning.
        let won = payments::transition_from_pending(&self.db, payment.id, PaymentStatus::Successful)
            .await?;
        if !won {
            info!(
                payment_id = payment.id,
                "concurrent delivery committed first; acknowledging"
            );
            return Ok(WebhookDisposition::Processed);
        }
        info!(payment_id = payment.id, reference = reference.as_str(), "payment successful");

        // 8. Provisioning. Runs at most once per payment because of step 7.
        self.provision(&payment).await?;
        Ok(WebhookDisposition::Processed)
    }

    /// Provisions the purchase or renewal a successful payment was for.
    ///
    /// Provider-side failures are terminal here: the user is told to
    /// contact support and the payment stays `successful`. Only storage
    /// and other unexpected failures propagate.
    async fn provision(&self, payment: &Payment) -> Result<(), NumioError> {
        let Some(key) = QuoteKey::parse(&payment.locked_quote_key) else {
            error!(
                payment_id = payment.id,
                quote_key = payment.locked_quote_key.as_str(),
                "unparseable quote key on successful payment"
            );
            return Err(NumioError::Internal(format!(
                "payment {} carries an unparseable quote key",
                payment.id
            )));
        };

        let Some(user) = users::get_user(&self.db, payment.user_id).await? else {
            return Err(NumioError::Internal(format!(
                "payment {} references missing user {}",
                payment.id, payment.user_id
            )));
        };
        let chat_id = user.telegram_id;

        match key {
            QuoteKey::Renewal { number_id, days } => {
                self.provision_renewal(payment, chat_id, number_id, days).await
            }
            QuoteKey::Purchase {
                country,
                service,
                kind,
            } => {
                self.provision_purchase(payment, chat_id, &country, &service, kind)
                    .await
            }
        }
    }

    async fn provision_renewal(
        &self,
        payment: &Payment,
        chat_id: i64,
        number_id: i64,
        days: u32,
    ) -> Result<(), NumioError> {
        let Some(number) = numbers::get_number(&self.db, number_id).await? else {
            error!(
                payment_id = payment.id,
                number_id, "renewal paid for a number that no longer exists"
            );
            self.notify_support(chat_id).await;
            return Ok(());
        };

        match self.provider.renew_number(&number.activation_id, days).await {
            Ok(Fetched::Available(())) => {
                numbers::extend_rental(&self.db, number_id, days).await?;
                info!(payment_id = payment.id, number_id, days, "rental renewed");
                let text = format!(
                    "Your rental for {} has been extended by {days} days.",
                    number.phone_number
                );
                self.notify(chat_id, &text, None).await;
                Ok(())
            }
            Ok(Fetched::Unavailable) => {
                error!(
                    payment_id = payment.id,
                    number_id, "provider refused renewal after successful payment"
                );
                self.notify_support(chat_id).await;
                Ok(())
            }
            Err(e) => {
                error!(
                    payment_id = payment.id,
                    number_id,
                    error = %e,
                    "provider renewal call failed after successful payment"
                );
                self.notify_support(chat_id).await;
                Ok(())
            }
        }
    }

    async fn provision_purchase(
        &self,
        payment: &Payment,
        chat_id: i64,
        country: &str,
        service: &str,
        kind: NumberKind,
    ) -> Result<(), NumioError> {
        // The provider wants the catalog's exact country name.
        let Some(country_entry) = catalog::country_by_id(country) else {
            error!(
                payment_id = payment.id,
                country, "quote key names a country missing from the catalog"
            );
            self.notify_support(chat_id).await;
            return Ok(());
        };

        let rent_days = match kind {
            NumberKind::Temporary => None,
            NumberKind::Rental { days } => Some(days),
        };

        match self
            .provider
            .buy_number(service, country_entry.id, rent_days)
            .await
        {
            Ok(Fetched::Available(purchased)) => {
                let expires_at = match kind {
                    NumberKind::Temporary => {
                        Utc::now()
                            + Duration::minutes(i64::from(self.pricing.temp_duration_minutes))
                    }
                    NumberKind::Rental { days } => Utc::now() + Duration::days(i64::from(days)),
                };
                let number = numbers::insert_number(
                    &self.db,
                    NewNumber {
                        phone_number: purchased.phone_number.clone(),
                        activation_id: purchased.activation_id.clone(),
                        service_code: service.to_string(),
                        country_code: country.to_string(),
                        is_rent: kind.is_rental(),
                        expires_at: format_timestamp(expires_at),
                        user_id: payment.user_id,
                        payment_id: payment.id,
                    },
                )
                .await?;
                info!(
                    payment_id = payment.id,
                    number_id = number.id,
                    phone = purchased.phone_number.as_str(),
                    "number provisioned"
                );

                let text = format!(
                    "Your {service} number in {} is ready:\n{}\nSMS codes will be forwarded here automatically.",
                    country_entry.name, purchased.phone_number
                );
                self.notify(
                    chat_id,
                    &text,
                    Some(NotifyAction::RefreshSms {
                        number_id: number.id,
                    }),
                )
                .await;
                Ok(())
            }
            Ok(Fetched::Unavailable) => {
                error!(
                    payment_id = payment.id,
                    country, service, "no number available after successful payment"
                );
                self.notify_support(chat_id).await;
                Ok(())
            }
            Err(e) => {
                error!(
                    payment_id = payment.id,
                    country,
                    service,
                    error = %e,
                    "provider purchase call failed after successful payment"
                );
                self.notify_support(chat_id).await;
                Ok(())
            }
        }
    }

    async fn notify(&self, chat_id: i64, text: &str, action: Option<NotifyAction>) {
        if let Err(e) = self.notifier.notify(chat_id, text, action).await {
            warn!(chat_id, error = %e, "notification delivery failed");
        }
    }

    async fn notify_support(&self, chat_id: i64) {
        self.notify(
            chat_id,
            "We received your payment but could not set up your number automatically. \
             Please contact support and we will sort it out.",
            None,
        )
        .await;
    }
}
