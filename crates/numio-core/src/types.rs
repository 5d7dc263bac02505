// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common domain types shared across the Numio workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// What kind of number an order is for.
///
/// Rental durations are part of the order identity: two rentals of
/// different lengths are different products and never share a quote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumberKind {
    /// Short-lived number for a single verification.
    Temporary,
    /// Rented number, active for the given number of days.
    Rental { days: u32 },
}

impl NumberKind {
    /// Returns true for rental orders.
    pub fn is_rental(&self) -> bool {
        matches!(self, NumberKind::Rental { .. })
    }
}

/// An immutable order handed from the dialog layer to the core.
///
/// Built once when the user finishes the selection flow and never mutated
/// afterwards; quoting and checkout both key off this value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OrderIntent {
    /// Provider-side country identifier (e.g. "Nigeria").
    pub country: String,
    /// Provider-side service identifier (e.g. "WhatsApp").
    pub service: String,
    /// Temporary or rental, with duration for rentals.
    pub kind: NumberKind,
}

/// Ledger state of a payment attempt.
///
/// Transitions are monotonic: `Pending` moves to exactly one of the other
/// three states and never back. `Successful` additionally gates
/// provisioning exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Successful,
    Failed,
    Disputed,
}

/// Lifecycle state of a provisioned number.
///
/// `Expired`, `Finished`, and `Banned` are terminal and never reverted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NumberStatus {
    Active,
    Expired,
    Finished,
    Banned,
}

/// An action control attached to an outbound notification.
///
/// The chat layer renders these as inline keyboard buttons; the core only
/// describes the intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyAction {
    /// Offer a manual SMS refresh for the given number.
    RefreshSms { number_id: i64 },
    /// Offer a rental renewal at the quoted price.
    RenewRental { number_id: i64, price_ngn: i64 },
}
