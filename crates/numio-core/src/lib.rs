// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Numio settlement engine.
//!
//! This crate provides the foundational error type, domain types, and the
//! notification trait shared across the Numio workspace. The pricing,
//! settlement, and worker crates all build on the definitions here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::NumioError;
pub use traits::NotificationSink;
pub use types::{NotifyAction, NumberKind, NumberStatus, OrderIntent, PaymentStatus};
