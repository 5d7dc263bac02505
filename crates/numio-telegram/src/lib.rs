// SPDX-FileCopyrightText: 2026 Numio Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram notification sink.
//!
//! Implements [`NotificationSink`] over the Telegram Bot API via teloxide.
//! The settlement core and workers describe an optional action with each
//! message; this adapter renders it as an inline keyboard button whose
//! callback data the (out-of-scope) dialog layer routes.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, Recipient};
use tracing::debug;

use numio_core::{NotificationSink, NotifyAction, NumioError};

/// Notification sink backed by a Telegram bot.
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    /// Creates a notifier from a bot token.
    pub fn new(token: &str) -> Result<Self, NumioError> {
        if token.is_empty() {
            return Err(NumioError::Config(
                "bot.token cannot be empty".into(),
            ));
        }
        Ok(Self {
            bot: Bot::new(token),
        })
    }

    /// Returns a reference to the underlying teloxide Bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

/// Renders an action as a one-button inline keyboard.
fn action_keyboard(action: NotifyAction) -> InlineKeyboardMarkup {
    let button = match action {
        NotifyAction::RefreshSms { number_id } => {
            InlineKeyboardButton::callback("Refresh SMS", format!("sms:refresh:{number_id}"))
        }
        NotifyAction::RenewRental {
            number_id,
            price_ngn,
        } => InlineKeyboardButton::callback(
            format!("Renew for \u{20a6}{price_ngn}"),
            format!("rent:renew:{number_id}"),
        ),
    };
    InlineKeyboardMarkup::new(vec![vec![button]])
}

#[async_trait]
impl NotificationSink for TelegramNotifier {
    async fn notify(
        &self,
        chat_id: i64,
        text: &str,
        action: Option<NotifyAction>,
    ) -> Result<(), NumioError> {
        debug!(chat_id, has_action = action.is_some(), "sending notification");

        let request = self.bot.send_message(Recipient::Id(ChatId(chat_id)), text);
        let request = match action {
            Some(action) => request.reply_markup(action_keyboard(action)),
            None => request,
        };

        request.await.map_err(|e| NumioError::Channel {
            message: format!("failed to send message to chat {chat_id}: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(())
    }
}
