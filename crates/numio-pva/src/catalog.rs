// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Static country and service catalog.
//!
//! The provider API has no listing endpoints: the `country` and `app`
//! parameters must exactly match agreed identifiers, so the catalog is
//! compiled in. Display names are what the chat layer shows to users.

/// A country the provider can issue numbers in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Country {
    /// Exact value of the API's `country` parameter.
    pub id: &'static str,
    /// Human-readable display name.
    pub name: &'static str,
    /// Whether rentals are offered for this country.
    pub rentable: bool,
}

/// A service numbers can be verified against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Service {
    /// Exact value of the API's `app` parameter.
    pub id: &'static str,
    /// Human-readable display name.
    pub name: &'static str,
}

/// Supported countries, in menu order.
pub const COUNTRIES: &[Country] = &[
    Country { id: "Malaysia", name: "\u{1F1F2}\u{1F1FE} Malaysia", rentable: true },
    Country { id: "Indonesia", name: "\u{1F1EE}\u{1F1E9} Indonesia", rentable: true },
    Country { id: "USA", name: "\u{1F1FA}\u{1F1F8} USA", rentable: true },
    Country { id: "Philippines", name: "\u{1F1F5}\u{1F1ED} Philippines", rentable: false },
    Country { id: "Nigeria", name: "\u{1F1F3}\u{1F1EC} Nigeria", rentable: true },
    Country { id: "UK", name: "\u{1F1EC}\u{1F1E7} UK", rentable: false },
];

/// Supported services, in menu order.
pub const SERVICES: &[Service] = &[
    Service { id: "Google", name: "Google / Gmail" },
    Service { id: "WhatsApp", name: "WhatsApp" },
    Service { id: "Telegram", name: "Telegram" },
    Service { id: "Facebook", name: "Facebook" },
    Service { id: "Tiktok", name: "Tiktok" },
    Service { id: "Amazon", name: "Amazon" },
];

/// Looks up a country by its API identifier.
pub fn country_by_id(id: &str) -> Option<&'static Country> {
    COUNTRIES.iter().find(|c| c.id == id)
}

/// Looks up a service by its API identifier.
pub fn service_by_id(id: &str) -> Option<&'static Service> {
    SERVICES.iter().find(|s| s.id == id)
}

/// Countries, optionally filtered to those offering rentals.
pub fn countries(rentable_only: bool) -> impl Iterator<Item = &'static Country> {
    COUNTRIES
        .iter()
        .filter(move |c| !rentable_only || c.rentable)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_country_resolves() {
        let ng = country_by_id("Nigeria").expect("Nigeria should exist");
        assert!(ng.name.contains("Nigeria"));
        assert!(ng.rentable);
    }

    #[test]
    fn unknown_country_is_none() {
        assert!(country_by_id("Atlantis").is_none());
    }

    #[test]
    fn rentable_filter_drops_non_rentable() {
        let all = countries(false).count();
        let rentable = countries(true).count();
        assert!(rentable < all);
        assert!(countries(true).all(|c| c.rentable));
    }

    #[test]
    fn known_service_resolves() {
        assert!(service_by_id("WhatsApp").is_some());
        assert!(service_by_id("MySpace").is_none());
    }
}
