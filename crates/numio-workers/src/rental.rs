// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rental expiry worker.
//!
//! Two passes per sweep: warn active rentals entering the expiry window
//! (once, with a renewal quote attached), and flip rentals past expiry to
//! expired. The notice flag is set only after the warning actually went
//! out; an unpriceable or undeliverable warning is retried next sweep.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use numio_core::{NotificationSink, NotifyAction, NumberStatus, NumioError};
use numio_pricing::{PricingEngine, QuoteOutcome};
use numio_storage::Database;
use numio_storage::models::format_timestamp;
use numio_storage::queries::numbers;

/// The rental expiry worker.
pub struct RentalWorker {
    db: Arc<Database>,
    pricing: Arc<PricingEngine>,
    notifier: Arc<dyn NotificationSink>,
    /// Days before expiry at which the warning goes out.
    warning_days: u32,
    /// Renewal length offered in the warning.
    renewal_days: u32,
}

impl RentalWorker {
    /// Creates a worker over the shared store and pricing engine.
    pub fn new(
        db: Arc<Database>,
        pricing: Arc<PricingEngine>,
        notifier: Arc<dyn NotificationSink>,
        warning_days: u32,
        renewal_days: u32,
    ) -> Self {
        Self {
            db,
            pricing,
            notifier,
            warning_days,
            renewal_days,
        }
    }

    /// Runs sweeps on `interval` until `cancel` fires.
    pub async fn run(self: Arc<Self>, interval: Duration, cancel: CancellationToken) {
        info!(interval_secs = interval.as_secs(), "rental expiry worker started");
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.sweep().await {
                        warn!(error = %e, "rental sweep failed (non-fatal)");
                    }
                }
                _ = cancel.cancelled() => {
                    info!("rental expiry worker shutting down");
                    break;
                }
            }
        }
    }

    /// One warning pass plus one expiry pass.
    pub async fn sweep(&self) -> Result<(), NumioError> {
        let now_dt = Utc::now();
        let now = format_timestamp(now_dt);
        let deadline = format_timestamp(now_dt + chrono::Duration::days(i64::from(self.warning_days)));

        // Warning pass.
        let expiring = numbers::list_rentals_needing_notice(&self.db, &now, &deadline).await?;
        for item in expiring {
            let number = &item.number;
            match self
                .pricing
                .renewal_quote(number.id, self.renewal_days)
                .await?
            {
                QuoteOutcome::Priced(quote) => {
                    let text = format!(
                        "Your rental for {} expires in less than {} days. \
                         Renew for \u{20a6}{} to keep your number.",
                        number.phone_number, self.warning_days, quote.price_ngn
                    );
                    match self
                        .notifier
                        .notify(
                            item.telegram_id,
                            &text,
                            Some(NotifyAction::RenewRental {
                                number_id: number.id,
                                price_ngn: quote.price_ngn,
                            }),
                        )
                        .await
                    {
                        Ok(()) => {
                            numbers::set_renewal_notice_sent(&self.db, number.id).await?;
                            info!(
                                number_id = number.id,
                                price_ngn = quote.price_ngn,
                                "renewal notice sent"
                            );
                        }
                        Err(e) => {
                            // Flag stays clear so the warning is retried.
                            warn!(
                                number_id = number.id,
                                chat_id = item.telegram_id,
                                error = %e,
                                "renewal notice delivery failed"
                            );
                        }
                    }
                }
                QuoteOutcome::Unavailable => {
                    warn!(
                        number_id = number.id,
                        "renewal currently unpriceable; retrying next sweep"
                    );
                }
            }
        }

        // Expiry pass.
        let expired = numbers::list_active_expired(&self.db, &now, true).await?;
        for item in expired {
            info!(
                number_id = item.number.id,
                phone = item.number.phone_number.as_str(),
                "rental expired"
            );
            numbers::mark_status(&self.db, item.number.id, NumberStatus::Expired).await?;
            let text = format!("Your rental for {} has expired.", item.number.phone_number);
            if let Err(e) = self.notifier.notify(item.telegram_id, &text, None).await {
                warn!(chat_id = item.telegram_id, error = %e, "expiry notification failed");
            }
        }

        Ok(())
    }
}
