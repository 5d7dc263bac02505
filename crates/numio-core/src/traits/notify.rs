// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification sink trait for delivering messages to users.

use async_trait::async_trait;

use crate::error::NumioError;
use crate::types::NotifyAction;

/// Outbound notification channel, implemented by the chat layer.
///
/// Delivery is fire-and-forget from the core's perspective: callers log a
/// failed send and move on, they never queue retries. The `action`
/// parameter describes an optional control the channel may render next to
/// the text (e.g. an inline button).
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Sends `text` to the user identified by their chat id.
    async fn notify(
        &self,
        chat_id: i64,
        text: &str,
        action: Option<NotifyAction>,
    ) -> Result<(), NumioError>;
}
