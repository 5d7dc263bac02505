// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMS reconciliation worker.
//!
//! Polls the provider for every active number, deduplicates against a
//! per-number last-seen marker, persists new messages, and notifies the
//! owner. Per number the order is persist -> notify -> advance marker, so
//! a crash in between costs at most one duplicate notification and never
//! a lost message.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use regex::Regex;
use sha2::{Digest, Sha256};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use numio_cache::TtlStore;
use numio_core::{NotificationSink, NotifyAction, NumberStatus, NumioError};
use numio_pva::{PvaClient, SmsPoll};
use numio_storage::Database;
use numio_storage::models::{NumberWithOwner, now_timestamp};
use numio_storage::queries::{numbers, sms};

/// Sentinel stored when no verification code could be extracted.
const CODE_NOT_FOUND: &str = "N/A";

/// Extracts the first run of 4-8 digits from an SMS text.
fn extract_code(text: &str) -> Option<&str> {
    static CODE_RE: OnceLock<Regex> = OnceLock::new();
    let re = CODE_RE.get_or_init(|| Regex::new(r"\b\d{4,8}\b").expect("static pattern compiles"));
    re.find(text).map(|m| m.as_str())
}

/// Stable identifier for a message: hash of activation id and text.
///
/// The provider has no message ids, so identity derives from content;
/// the same still-pending message hashes identically on every poll.
fn sms_signature(activation_id: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(activation_id.as_bytes());
    hasher.update(b"\x1f");
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// The SMS polling worker.
pub struct SmsWorker {
    db: Arc<Database>,
    provider: Arc<PvaClient>,
    markers: Arc<TtlStore>,
    notifier: Arc<dyn NotificationSink>,
}

impl SmsWorker {
    /// Creates a worker over the shared store, provider, and marker cache.
    pub fn new(
        db: Arc<Database>,
        provider: Arc<PvaClient>,
        markers: Arc<TtlStore>,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            db,
            provider,
            markers,
            notifier,
        }
    }

    /// Runs sweeps on `interval` until `cancel` fires.
    ///
    /// Sweeps run inline on the loop task, so one finishes before the
    /// next begins and cancellation lands at a sweep boundary.
    pub async fn run(self: Arc<Self>, interval: Duration, cancel: CancellationToken) {
        info!(interval_secs = interval.as_secs(), "SMS reconciliation worker started");
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep().await {
                        warn!(error = %e, "SMS sweep failed (non-fatal)");
                    }
                }
                _ = cancel.cancelled() => {
                    info!("SMS reconciliation worker shutting down");
                    break;
                }
            }
        }
    }

    /// One full sweep over all active numbers.
    pub async fn sweep(&self) -> Result<(), NumioError> {
        let now = now_timestamp();

        let active = numbers::list_active_unexpired(&self.db, &now).await?;
        if active.is_empty() {
            debug!("no active numbers to poll");
        }
        for item in &active {
            if let Err(e) = self.poll_number(item).await {
                warn!(
                    number_id = item.number.id,
                    error = %e,
                    "poll failed; retrying next sweep"
                );
            }
        }

        // Numbers past their own expiry flip regardless of what the
        // provider said this sweep.
        let expired = numbers::list_active_expired(&self.db, &now, false).await?;
        for item in expired {
            info!(
                number_id = item.number.id,
                phone = item.number.phone_number.as_str(),
                "number expired"
            );
            numbers::mark_status(&self.db, item.number.id, NumberStatus::Expired).await?;
            let text = format!("Your number {} has expired.", item.number.phone_number);
            if let Err(e) = self.notifier.notify(item.telegram_id, &text, None).await {
                warn!(chat_id = item.telegram_id, error = %e, "expiry notification failed");
            }
        }

        Ok(())
    }

    /// Polls one number and processes whatever came back.
    async fn poll_number(&self, item: &NumberWithOwner) -> Result<(), NumioError> {
        let number = &item.number;
        debug!(
            number_id = number.id,
            phone = number.phone_number.as_str(),
            "polling for SMS"
        );

        let poll = self
            .provider
            .get_sms(
                &number.phone_number,
                &number.service_code,
                &number.country_code,
                number.is_rent,
            )
            .await?;

        match poll {
            SmsPoll::Waiting => Ok(()),
            SmsPoll::Terminal { status } => {
                warn!(
                    number_id = number.id,
                    provider_status = status.as_str(),
                    "provider reports terminal status; deactivating"
                );
                numbers::mark_status(&self.db, number.id, NumberStatus::Expired).await
            }
            SmsPoll::Received { text } => self.process_message(item, &text).await,
        }
    }

    /// Persists and delivers a message unless it was already seen.
    async fn process_message(&self, item: &NumberWithOwner, text: &str) -> Result<(), NumioError> {
        let number = &item.number;
        let signature = sms_signature(&number.activation_id, text);
        let marker_key = format!("sms_seen:{}", number.id);

        if self.markers.get(&marker_key).as_deref() == Some(signature.as_str()) {
            return Ok(());
        }

        let code = extract_code(text).unwrap_or(CODE_NOT_FOUND);
        let inserted =
            sms::insert_sms_if_new(&self.db, number.id, &signature, text, Some(code)).await?;
        if inserted {
            info!(
                number_id = number.id,
                phone = number.phone_number.as_str(),
                "new SMS persisted"
            );
        }

        let notification = format!("Verification code: {code}\n\nFull message:\n{text}");
        if let Err(e) = self
            .notifier
            .notify(
                item.telegram_id,
                &notification,
                Some(NotifyAction::RefreshSms {
                    number_id: number.id,
                }),
            )
            .await
        {
            // Leave the marker unset so the next sweep retries delivery.
            warn!(chat_id = item.telegram_id, error = %e, "SMS notification failed");
            return Ok(());
        }

        self.markers.set(&marker_key, signature, None);
        Ok(())
    }
}
