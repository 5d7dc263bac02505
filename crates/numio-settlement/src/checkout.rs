// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payment creation.
//!
//! The pending ledger row is written BEFORE the gateway call so a failed
//! or abandoned initialization still leaves an audit trail. A pending row
//! that never completes simply ages out; nothing rolls it back.

use tracing::{info, warn};

use numio_core::NumioError;
use numio_paystack::PaystackClient;
use numio_pricing::{PriceLocks, QuoteKey};
use numio_storage::Database;
use numio_storage::queries::{payments, users};

/// Creates a pending payment for `price_ngn` and returns the hosted
/// checkout URL.
///
/// Returns `Ok(None)` when the gateway is unavailable or the user record
/// is missing; the pending row (if written) stays for the audit trail.
pub async fn create_checkout(
    db: &Database,
    locks: &PriceLocks,
    paystack: &PaystackClient,
    user_id: i64,
    price_ngn: i64,
    quote_key: &QuoteKey,
) -> Result<Option<String>, NumioError> {
    let Some(user) = users::get_user(db, user_id).await? else {
        warn!(user_id, "checkout requested for unknown user");
        return Ok(None);
    };

    // Paystack prices in kobo and requires an email; users are known only
    // by their Telegram id, so a placeholder address is derived from it.
    let amount_kobo = price_ngn * 100;
    let email = format!("user_{}@numio.bot", user.telegram_id);

    // The random suffix keeps retries from colliding on the unique
    // reference constraint.
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    let reference = format!("num-{}-{}", user.id, &suffix[..8]);

    let payment = payments::insert_payment(
        db,
        user.id,
        amount_kobo,
        &reference,
        &quote_key.storage_key(),
    )
    .await?;
    info!(
        payment_id = payment.id,
        reference = reference.as_str(),
        amount_kobo,
        "pending payment recorded"
    );

    locks.lock(payment.id, quote_key);

    match paystack
        .initialize_transaction(&email, amount_kobo, &reference)
        .await
    {
        Ok(url) => Ok(Some(url)),
        Err(NumioError::Gateway { message, .. }) => {
            warn!(
                payment_id = payment.id,
                error = message.as_str(),
                "gateway initialization failed; pending row kept"
            );
            Ok(None)
        }
        Err(e) => Err(e),
    }
}
