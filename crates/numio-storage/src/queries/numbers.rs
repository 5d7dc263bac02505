// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Number lifecycle operations.
//!
//! Status only ever moves away from `active`; `expires_at` only ever
//! extends. The workers read through the joined [`NumberWithOwner`] shape
//! so a sweep never needs a second query for the chat id.

use std::str::FromStr;

use rusqlite::params;

use numio_core::{NumberStatus, NumioError};

use crate::database::Database;
use crate::models::{NewNumber, Number, NumberWithOwner};

const NUMBER_COLUMNS: &str = "n.id, n.phone_number, n.activation_id, n.service_code, \
     n.country_code, n.status, n.is_rent, n.renewal_notice_sent, n.expires_at, \
     n.user_id, n.payment_id, n.created_at, n.updated_at";

fn row_to_number(row: &rusqlite::Row<'_>) -> Result<Number, rusqlite::Error> {
    let status_text: String = row.get(5)?;
    let status = NumberStatus::from_str(&status_text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(Number {
        id: row.get(0)?,
        phone_number: row.get(1)?,
        activation_id: row.get(2)?,
        service_code: row.get(3)?,
        country_code: row.get(4)?,
        status,
        is_rent: row.get(6)?,
        renewal_notice_sent: row.get(7)?,
        expires_at: row.get(8)?,
        user_id: row.get(9)?,
        payment_id: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

fn row_to_number_with_owner(row: &rusqlite::Row<'_>) -> Result<NumberWithOwner, rusqlite::Error> {
    Ok(NumberWithOwner {
        number: row_to_number(row)?,
        telegram_id: row.get(13)?,
    })
}

/// Insert a freshly provisioned number with status `active`.
pub async fn insert_number(db: &Database, new: NewNumber) -> Result<Number, NumioError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO numbers
                     (phone_number, activation_id, service_code, country_code,
                      is_rent, expires_at, user_id, payment_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    new.phone_number,
                    new.activation_id,
                    new.service_code,
                    new.country_code,
                    new.is_rent,
                    new.expires_at,
                    new.user_id,
                    new.payment_id,
                ],
            )?;
            let id = conn.last_insert_rowid();
            let mut stmt = conn.prepare(&format!(
                "SELECT {NUMBER_COLUMNS} FROM numbers n WHERE n.id = ?1"
            ))?;
            let number = stmt.query_row(params![id], row_to_number)?;
            Ok(number)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a number by id.
pub async fn get_number(db: &Database, id: i64) -> Result<Option<Number>, NumioError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {NUMBER_COLUMNS} FROM numbers n WHERE n.id = ?1"
            ))?;
            let result = stmt.query_row(params![id], row_to_number);
            match result {
                Ok(number) => Ok(Some(number)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Active numbers whose expiry is still in the future, with owners.
pub async fn list_active_unexpired(
    db: &Database,
    now: &str,
) -> Result<Vec<NumberWithOwner>, NumioError> {
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {NUMBER_COLUMNS}, u.telegram_id
                 FROM numbers n JOIN users u ON u.id = n.user_id
                 WHERE n.status = 'active' AND n.expires_at > ?1
                 ORDER BY n.id"
            ))?;
            let rows = stmt.query_map(params![now], row_to_number_with_owner)?;
            let mut numbers = Vec::new();
            for row in rows {
                numbers.push(row?);
            }
            Ok(numbers)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Active numbers already past expiry, with owners.
pub async fn list_active_expired(
    db: &Database,
    now: &str,
    rentals_only: bool,
) -> Result<Vec<NumberWithOwner>, NumioError> {
    let now = now.to_string();
    db.connection()
        .call(move |conn| {
            let rent_clause = if rentals_only { "AND n.is_rent = 1" } else { "" };
            let mut stmt = conn.prepare(&format!(
                "SELECT {NUMBER_COLUMNS}, u.telegram_id
                 FROM numbers n JOIN users u ON u.id = n.user_id
                 WHERE n.status = 'active' AND n.expires_at <= ?1 {rent_clause}
                 ORDER BY n.id"
            ))?;
            let rows = stmt.query_map(params![now], row_to_number_with_owner)?;
            let mut numbers = Vec::new();
            for row in rows {
                numbers.push(row?);
            }
            Ok(numbers)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Active rentals inside the warning window that have not been warned yet.
pub async fn list_rentals_needing_notice(
    db: &Database,
    now: &str,
    warning_deadline: &str,
) -> Result<Vec<NumberWithOwner>, NumioError> {
    let now = now.to_string();
    let warning_deadline = warning_deadline.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {NUMBER_COLUMNS}, u.telegram_id
                 FROM numbers n JOIN users u ON u.id = n.user_id
                 WHERE n.status = 'active'
                   AND n.is_rent = 1
                   AND n.renewal_notice_sent = 0
                   AND n.expires_at > ?1
                   AND n.expires_at <= ?2
                 ORDER BY n.expires_at"
            ))?;
            let rows = stmt.query_map(params![now, warning_deadline], row_to_number_with_owner)?;
            let mut numbers = Vec::new();
            for row in rows {
                numbers.push(row?);
            }
            Ok(numbers)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Flip a number's status.
pub async fn mark_status(db: &Database, id: i64, status: NumberStatus) -> Result<(), NumioError> {
    let status = status.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE numbers
                 SET status = ?1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2",
                params![status, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Record that the renewal warning for a rental went out.
pub async fn set_renewal_notice_sent(db: &Database, id: i64) -> Result<(), NumioError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE numbers
                 SET renewal_notice_sent = 1, updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?1",
                params![id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Extend a rental by `days` and clear its renewal notice flag.
///
/// The SQL adds to the stored expiry, so the value strictly increases.
pub async fn extend_rental(db: &Database, id: i64, days: u32) -> Result<(), NumioError> {
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE numbers
                 SET expires_at = strftime('%Y-%m-%dT%H:%M:%fZ', expires_at, '+' || ?1 || ' days'),
                     renewal_notice_sent = 0,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
                 WHERE id = ?2",
                params![days, id],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}
