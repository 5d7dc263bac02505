// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SMS message persistence.
//!
//! Messages are insert-only. The unique provider SMS id absorbs
//! re-polling: inserting an already-seen message is a no-op, reported to
//! the caller so it can skip the user notification.

use rusqlite::params;

use numio_core::NumioError;

use crate::database::Database;
use crate::models::SmsMessage;

/// Insert a message unless its provider id was already stored.
///
/// Returns `true` when a row was actually inserted.
pub async fn insert_sms_if_new(
    db: &Database,
    number_id: i64,
    provider_sms_id: &str,
    full_text: &str,
    verification_code: Option<&str>,
) -> Result<bool, NumioError> {
    let provider_sms_id = provider_sms_id.to_string();
    let full_text = full_text.to_string();
    let verification_code = verification_code.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "INSERT OR IGNORE INTO sms_messages
                     (number_id, provider_sms_id, full_text, verification_code)
                 VALUES (?1, ?2, ?3, ?4)",
                params![number_id, provider_sms_id, full_text, verification_code],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Messages stored for a number, oldest first.
pub async fn list_for_number(
    db: &Database,
    number_id: i64,
) -> Result<Vec<SmsMessage>, NumioError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, number_id, provider_sms_id, full_text, verification_code, created_at
                 FROM sms_messages WHERE number_id = ?1 ORDER BY id",
            )?;
            let rows = stmt.query_map(params![number_id], |row| {
                Ok(SmsMessage {
                    id: row.get(0)?,
                    number_id: row.get(1)?,
                    provider_sms_id: row.get(2)?,
                    full_text: row.get(3)?,
                    verification_code: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
