// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured quote keys.
//!
//! A quote key identifies the exact inputs a price was computed from and
//! doubles as the routing tag for provisioning: a `Purchase` key makes
//! the reconciler buy a new number, a `Renewal` key makes it extend an
//! existing rental. Keys are serialized to a stable string only at the
//! cache/ledger boundary and parsed back in exactly one place, here.

use std::fmt;

use numio_core::{NumberKind, OrderIntent};

/// Identity of a quote, including everything that discriminates its price.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QuoteKey {
    /// A new number purchase for (country, service, kind).
    Purchase {
        country: String,
        service: String,
        kind: NumberKind,
    },
    /// A renewal of an existing rental by `days`.
    Renewal { number_id: i64, days: u32 },
}

impl QuoteKey {
    /// Key for a purchase order.
    pub fn purchase(intent: &OrderIntent) -> Self {
        QuoteKey::Purchase {
            country: intent.country.clone(),
            service: intent.service.clone(),
            kind: intent.kind,
        }
    }

    /// Key for a rental renewal.
    pub fn renewal(number_id: i64, days: u32) -> Self {
        QuoteKey::Renewal { number_id, days }
    }

    /// The string form stored in the cache and on the payment row.
    pub fn storage_key(&self) -> String {
        self.to_string()
    }

    /// Parses a storage key back into its structured form.
    ///
    /// Returns `None` for malformed input; callers treat that as a
    /// corrupt ledger value, not a user error.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.split(':');
        if parts.next()? != "quote" {
            return None;
        }
        match parts.next()? {
            "renew" => {
                let number_id = parts.next()?.parse().ok()?;
                let days = parts.next()?.parse().ok()?;
                if parts.next().is_some() {
                    return None;
                }
                Some(QuoteKey::Renewal { number_id, days })
            }
            country => {
                let service = parts.next()?.to_string();
                let kind = match parts.next()? {
                    "temp" => NumberKind::Temporary,
                    "rent" => NumberKind::Rental {
                        days: parts.next()?.parse().ok()?,
                    },
                    _ => return None,
                };
                if parts.next().is_some() {
                    return None;
                }
                Some(QuoteKey::Purchase {
                    country: country.to_string(),
                    service,
                    kind,
                })
            }
        }
    }
}

impl fmt::Display for QuoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuoteKey::Purchase {
                country,
                service,
                kind: NumberKind::Temporary,
            } => write!(f, "quote:{country}:{service}:temp"),
            QuoteKey::Purchase {
                country,
                service,
                kind: NumberKind::Rental { days },
            } => write!(f, "quote:{country}:{service}:rent:{days}"),
            QuoteKey::Renewal { number_id, days } => {
                write!(f, "quote:renew:{number_id}:{days}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intent(kind: NumberKind) -> OrderIntent {
        OrderIntent {
            country: "Nigeria".into(),
            service: "WhatsApp".into(),
            kind,
        }
    }

    #[test]
    fn temporary_key_round_trips() {
        let key = QuoteKey::purchase(&intent(NumberKind::Temporary));
        assert_eq!(key.storage_key(), "quote:Nigeria:WhatsApp:temp");
        assert_eq!(QuoteKey::parse(&key.storage_key()), Some(key));
    }

    #[test]
    fn rental_key_round_trips() {
        let key = QuoteKey::purchase(&intent(NumberKind::Rental { days: 7 }));
        assert_eq!(key.storage_key(), "quote:Nigeria:WhatsApp:rent:7");
        assert_eq!(QuoteKey::parse(&key.storage_key()), Some(key));
    }

    #[test]
    fn renewal_key_round_trips() {
        let key = QuoteKey::renewal(42, 30);
        assert_eq!(key.storage_key(), "quote:renew:42:30");
        assert_eq!(QuoteKey::parse(&key.storage_key()), Some(key));
    }

    #[test]
    fn rental_durations_never_collide() {
        let week = QuoteKey::purchase(&intent(NumberKind::Rental { days: 7 }));
        let month = QuoteKey::purchase(&intent(NumberKind::Rental { days: 30 }));
        assert_ne!(week.storage_key(), month.storage_key());
    }

    #[test]
    fn malformed_keys_parse_to_none() {
        assert_eq!(QuoteKey::parse(""), None);
        assert_eq!(QuoteKey::parse("pricing:Nigeria:WhatsApp:temp"), None);
        assert_eq!(QuoteKey::parse("quote:Nigeria:WhatsApp"), None);
        assert_eq!(QuoteKey::parse("quote:Nigeria:WhatsApp:weekly"), None);
        assert_eq!(QuoteKey::parse("quote:renew:abc:30"), None);
        assert_eq!(QuoteKey::parse("quote:Nigeria:WhatsApp:temp:extra"), None);
    }
}
