// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pricing engine for the Numio settlement core.
//!
//! Bridges the volatile upstream USD cost to a fixed NGN quote a user can
//! commit to pay: [`calculator`] is the pure math, [`key`] the structured
//! cache key, [`engine`] the cache-then-fetch orchestration, and [`lock`]
//! the short-lived binding between a pending payment and the quote it was
//! created from.

pub mod calculator;
pub mod engine;
pub mod fx;
pub mod key;
pub mod lock;

pub use calculator::{PricingRules, calculate_price};
pub use engine::{PricingEngine, Quote, QuoteOutcome};
pub use fx::{FxRateSource, StaticFxRate};
pub use key::QuoteKey;
pub use lock::PriceLocks;
