// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `numio serve` command implementation.
//!
//! Wires storage, the shared TTL cache, the provider and gateway clients,
//! the Telegram notifier, the webhook reconciler, and both background
//! workers into one long-running process. A fatal startup error (missing
//! secret, unreachable database, unbindable port) propagates out and the
//! binary exits non-zero.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use numio_cache::TtlStore;
use numio_config::model::NumioConfig;
use numio_core::{NotificationSink, NumioError};
use numio_gateway::{ServerConfig, WebhookState};
use numio_paystack::PaystackClient;
use numio_pricing::{PricingEngine, StaticFxRate};
use numio_pva::PvaClient;
use numio_settlement::WebhookReconciler;
use numio_storage::Database;
use numio_telegram::TelegramNotifier;
use numio_workers::{RentalWorker, SmsWorker};

use crate::shutdown;

/// Runs the `numio serve` command.
pub async fn run_serve(config: NumioConfig) -> Result<(), NumioError> {
    init_tracing(&config.service.log_level);

    info!("starting numio serve");

    // Storage.
    let db = Arc::new(
        Database::open(&config.storage.database_path, config.storage.wal_mode).await?,
    );
    info!(path = config.storage.database_path.as_str(), "storage ready");

    // Shared TTL store: quote cache, price locks, SMS dedup markers.
    let cache = Arc::new(TtlStore::new());

    // Telegram notifier.
    let bot_token = config.bot.token.as_deref().ok_or_else(|| {
        eprintln!("error: Telegram bot token required. Set bot.token or NUMIO_BOT_TOKEN.");
        NumioError::Config("bot.token is required".into())
    })?;
    let notifier: Arc<dyn NotificationSink> = Arc::new(TelegramNotifier::new(bot_token)?);

    // Number provider client.
    let provider_key = config.provider.api_key.clone().ok_or_else(|| {
        eprintln!("error: provider API key required. Set provider.api_key or NUMIO_PROVIDER_API_KEY.");
        NumioError::Config("provider.api_key is required".into())
    })?;
    let provider = Arc::new(PvaClient::new(provider_key, config.provider.base_url.clone())?);

    // Payment gateway client. The secret key doubles as the webhook
    // signature secret.
    let paystack_secret = config.paystack.secret_key.clone().ok_or_else(|| {
        eprintln!(
            "error: Paystack secret key required. Set paystack.secret_key or NUMIO_PAYSTACK_SECRET_KEY."
        );
        NumioError::Config("paystack.secret_key is required".into())
    })?;
    let paystack = Arc::new(PaystackClient::new(
        &paystack_secret,
        config.paystack.base_url.clone(),
    )?);

    // Pricing engine (renewal quotes for the rental worker; the dialog
    // layer drives purchase quotes through the same instance).
    let fx = Arc::new(StaticFxRate::new(config.pricing.fx_rate_fallback));
    let pricing = Arc::new(PricingEngine::new(
        cache.clone(),
        provider.clone(),
        fx,
        config.pricing.clone(),
    ));

    // Webhook reconciler.
    let reconciler = Arc::new(WebhookReconciler::new(
        db.clone(),
        paystack.clone(),
        provider.clone(),
        notifier.clone(),
        paystack_secret,
        config.pricing.clone(),
    ));

    // Install signal handler.
    let cancel = shutdown::install_signal_handler();

    // Spawn the SMS reconciliation worker.
    let sms_worker = Arc::new(SmsWorker::new(
        db.clone(),
        provider.clone(),
        cache.clone(),
        notifier.clone(),
    ));
    let sms_handle = tokio::spawn(sms_worker.run(
        Duration::from_secs(config.workers.sms_poll_interval_secs),
        cancel.clone(),
    ));

    // Spawn the rental expiry worker.
    let rental_worker = Arc::new(RentalWorker::new(
        db.clone(),
        pricing,
        notifier.clone(),
        config.workers.renewal_warning_days,
        config.pricing.rental_renewal_days,
    ));
    let rental_handle = tokio::spawn(rental_worker.run(
        Duration::from_secs(config.workers.rental_poll_interval_secs),
        cancel.clone(),
    ));

    // Serve webhooks until shutdown.
    let server_config = ServerConfig {
        host: config.webhook.host.clone(),
        port: config.webhook.port,
        path: config.webhook.path.clone(),
    };
    let state = WebhookState {
        reconciler,
        start_time: std::time::Instant::now(),
    };
    let serve_result = numio_gateway::start_server(&server_config, state, cancel.clone()).await;
    if let Err(ref e) = serve_result {
        error!(error = %e, "webhook server exited with error");
        // Bring the workers down with us.
        cancel.cancel();
    }

    // Drain workers at their sweep boundaries.
    let _ = sms_handle.await;
    let _ = rental_handle.await;

    db.close().await?;
    info!("numio serve shutdown complete");
    serve_result
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("numio={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
