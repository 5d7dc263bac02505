// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP listener for payment gateway webhooks.
//!
//! Exposes the Paystack webhook endpoint and an unauthenticated health
//! route. The handler hands the raw body bytes to the reconciler
//! untouched; all trust decisions happen there.

pub mod handlers;
pub mod server;

pub use server::{ServerConfig, WebhookState, build_router, start_server};
