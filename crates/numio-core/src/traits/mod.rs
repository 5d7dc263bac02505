// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait definitions for external collaborators of the settlement core.

pub mod notify;

pub use notify::NotificationSink;
