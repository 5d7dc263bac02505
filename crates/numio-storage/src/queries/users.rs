// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! User CRUD operations.

use rusqlite::params;

use numio_core::NumioError;

use crate::database::Database;
use crate::models::User;

fn row_to_user(row: &rusqlite::Row<'_>) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get(0)?,
        telegram_id: row.get(1)?,
        full_name: row.get(2)?,
        username: row.get(3)?,
        language_code: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

const USER_COLUMNS: &str =
    "id, telegram_id, full_name, username, language_code, created_at, updated_at";

/// Create or refresh a user keyed by their Telegram id.
///
/// The dialog layer calls this on first contact; the core only reads.
pub async fn upsert_user(
    db: &Database,
    telegram_id: i64,
    full_name: Option<&str>,
    username: Option<&str>,
) -> Result<User, NumioError> {
    let full_name = full_name.map(|s| s.to_string());
    let username = username.map(|s| s.to_string());
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO users (telegram_id, full_name, username)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(telegram_id) DO UPDATE SET
                     full_name = excluded.full_name,
                     username = excluded.username,
                     updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
                params![telegram_id, full_name, username],
            )?;
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE telegram_id = ?1"
            ))?;
            let user = stmt.query_row(params![telegram_id], row_to_user)?;
            Ok(user)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a user by internal id.
pub async fn get_user(db: &Database, id: i64) -> Result<Option<User>, NumioError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?;
            let result = stmt.query_row(params![id], row_to_user);
            match result {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a user by Telegram id.
pub async fn get_user_by_telegram_id(
    db: &Database,
    telegram_id: i64,
) -> Result<Option<User>, NumioError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE telegram_id = ?1"
            ))?;
            let result = stmt.query_row(params![telegram_id], row_to_user);
            match result {
                Ok(user) => Ok(Some(user)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}
