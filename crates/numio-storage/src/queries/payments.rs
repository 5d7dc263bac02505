// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payment ledger operations.
//!
//! Rows are insert-then-transition only: status moves out of `pending`
//! exactly once via [`transition_from_pending`], and nothing here ever
//! deletes a row.

use std::str::FromStr;

use rusqlite::params;

use numio_core::{NumioError, PaymentStatus};

use crate::database::Database;
use crate::models::Payment;

const PAYMENT_COLUMNS: &str =
    "id, user_id, amount_kobo, status, paystack_ref, locked_quote_key, created_at, updated_at";

fn row_to_payment(row: &rusqlite::Row<'_>) -> Result<Payment, rusqlite::Error> {
    let status_text: String = row.get(3)?;
    let status = PaymentStatus::from_str(&status_text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Payment {
        id: row.get(0)?,
        user_id: row.get(1)?,
        amount_kobo: row.get(2)?,
        status,
        paystack_ref: row.get(4)?,
        locked_quote_key: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

/// Insert a new `pending` payment and return the stored row.
///
/// Fails on a duplicate reference; references carry a random component so
/// this only fires on a genuine collision.
pub async fn insert_payment(
    db: &Database,
    user_id: i64,
    amount_kobo: i64,
    paystack_ref: &str,
    locked_quote_key: &str,
) -> Result<Payment, NumioError> {
    let paystack_ref = paystack_ref.to_string();
    let locked_quote_key = locked_quote_key.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO payments (user_id, amount_kobo, status, paystack_ref, locked_quote_key)
                 VALUES (?1, ?2, 'pending', ?3, ?4)",
                params![user_id, amount_kobo, paystack_ref, locked_quote_key],
            )?;
            let id = conn.last_insert_rowid();
            let mut stmt = conn.prepare(&format!(
                "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = ?1"
            ))?;
            let payment = stmt.query_row(params![id], row_to_payment)?;
            Ok(payment)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Find a payment by its gateway reference.
pub async fn get_payment_by_reference(
    db: &Database,
    reference: &str,
) -> Result<Option<Payment>, NumioError> {
    let reference = reference.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PAYMENT_COLUMNS} FROM payments WHERE paystack_ref = ?1"
            ))?;
            let result = stmt.query_row(params![reference], row_to_payment);
            match result {
                Ok(payment) => Ok(Some(payment)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a payment by id.
pub async fn get_payment(db: &Database, id: i64) -> Result<Option<Payment>, NumioError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], row_to_payment);
            match result {
                Ok(payment) => Ok(Some(payment)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Move a payment out of `pending` into a terminal state.
///
/// Returns `true` if this call performed the transition, `false` if the
/// row was no longer pending (a concurrent reconciliation won, or the
/// transition already happened). This conditional write is the race
/// closure for duplicate webhook deliveries.
pub async fn transition_from_pending(
    db: &Database,
    id: i64,
    to: PaymentStatus,
) -> Result<bool, NumioError> {
    debug_assert_ne!(to, PaymentStatus::Pending);
    let to = to.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE payments
                 SET status = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2 AND status = 'pending'",
                params![to, id],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
