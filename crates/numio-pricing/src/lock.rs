// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Price locks.
//!
//! A lock binds a pending payment to the quote key that was active when
//! the user committed to pay, for the lock TTL (15 minutes observed).
//! TTL expiry is the only cleanup; success paths never delete locks.

use std::sync::Arc;
use std::time::Duration;

use numio_cache::TtlStore;
use tracing::debug;

use crate::key::QuoteKey;

/// Store of payment-id -> quote-key bindings with a short TTL.
#[derive(Clone)]
pub struct PriceLocks {
    store: Arc<TtlStore>,
    ttl: Duration,
}

impl PriceLocks {
    /// Creates a lock store over the shared TTL cache.
    pub fn new(store: Arc<TtlStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    fn lock_key(payment_id: i64) -> String {
        format!("lock:{payment_id}")
    }

    /// Locks `key` for the given payment.
    pub fn lock(&self, payment_id: i64, key: &QuoteKey) {
        debug!(payment_id, quote_key = %key, "price lock written");
        self.store
            .set(&Self::lock_key(payment_id), key.storage_key(), Some(self.ttl));
    }

    /// Returns the quote key locked for a payment, if still live.
    pub fn get(&self, payment_id: i64) -> Option<QuoteKey> {
        self.store
            .get(&Self::lock_key(payment_id))
            .and_then(|s| QuoteKey::parse(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use numio_core::{NumberKind, OrderIntent};

    #[test]
    fn lock_and_read_back() {
        let locks = PriceLocks::new(Arc::new(TtlStore::new()), Duration::from_secs(900));
        let key = QuoteKey::purchase(&OrderIntent {
            country: "USA".into(),
            service: "Google".into(),
            kind: NumberKind::Temporary,
        });

        locks.lock(7, &key);
        assert_eq!(locks.get(7), Some(key));
        assert_eq!(locks.get(8), None);
    }

    #[test]
    fn expired_lock_is_gone() {
        let locks = PriceLocks::new(Arc::new(TtlStore::new()), Duration::from_millis(5));
        locks.lock(7, &QuoteKey::renewal(1, 30));
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(locks.get(7), None);
    }
}
