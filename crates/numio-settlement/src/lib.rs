// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Payment settlement for the Numio engine.
//!
//! [`checkout`] turns a committed quote into a pending ledger row plus a
//! hosted payment link; [`reconciler`] consumes gateway webhook events and
//! drives the payment state machine through verification, amount
//! cross-check, the one-shot success commit, and provisioning.

pub mod checkout;
pub mod reconciler;

pub use checkout::create_checkout;
pub use reconciler::{RejectReason, WebhookDisposition, WebhookReconciler};
