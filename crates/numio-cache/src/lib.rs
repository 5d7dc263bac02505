// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process key/value store with per-entry TTL.
//!
//! Backs the quote cache, price locks, and SMS dedup markers. Entries are
//! last-writer-wins on the same key; expiry is checked lazily on read, so
//! an expired entry occupies memory until the next `get` or overwrite.
//! All values are plain strings; callers serialize structured data at
//! this boundary.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::trace;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

/// Shared TTL store. Cheap to clone handles via `Arc` at call sites.
#[derive(Debug, Default)]
pub struct TtlStore {
    entries: DashMap<String, Entry>,
}

impl TtlStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces `key`, expiring after `ttl` if given.
    ///
    /// `None` means the entry never expires (used for dedup markers).
    pub fn set(&self, key: &str, value: impl Into<String>, ttl: Option<Duration>) {
        let entry = Entry {
            value: value.into(),
            expires_at: ttl.map(|d| Instant::now() + d),
        };
        trace!(key, ttl = ?ttl, "cache set");
        self.entries.insert(key.to_string(), entry);
    }

    /// Returns the live value for `key`, removing it if expired.
    pub fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        // The read guard must drop before remove_if touches the same shard.
        {
            let entry = self.entries.get(key)?;
            if !entry.is_expired(now) {
                return Some(entry.value.clone());
            }
        }
        self.entries.remove_if(key, |_, e| e.is_expired(now));
        None
    }

    /// Removes `key` if present.
    pub fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Number of entries currently held, including not-yet-collected
    /// expired ones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
