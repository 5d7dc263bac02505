// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the upstream virtual-number provider.
//!
//! The provider speaks a plain-text protocol over GET requests: success
//! bodies carry the payload directly (a phone number, a price, an SMS
//! text) and failure bodies carry human-readable phrases. [`protocol`]
//! centralizes the sniffing so "no such combination" and "no code yet"
//! stay ordinary values while transport failures surface as
//! [`NumioError::Provider`].

pub mod catalog;
pub mod client;
pub mod protocol;

pub use client::{Fetched, PurchasedNumber, PvaClient, ServicePrice, SmsPoll};
