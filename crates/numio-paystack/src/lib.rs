// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Paystack payment gateway integration.
//!
//! [`client`] wraps the REST API (initialize + verify); [`webhook`]
//! verifies inbound event signatures over the exact raw request bytes and
//! parses the event envelope.

pub mod client;
pub mod webhook;

pub use client::{PaystackClient, VerifiedTransaction};
pub use webhook::{
    CHARGE_SUCCESS_EVENT, SIGNATURE_HEADER, WebhookData, WebhookEvent, verify_signature,
};
