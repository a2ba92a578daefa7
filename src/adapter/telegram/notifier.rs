//! Telegram notification dispatch and inbound command handling.

use std::sync::Arc;

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{BotCommand as TelegramBotCommand, ParseMode};
use tracing::{error, info, warn};

use super::command::{bot_commands, parse_command, CommandParseError};
use super::control::BotControl;
use crate::port::Dispatcher;

/// Sends notifications through the Telegram Bot API.
pub struct TelegramDispatcher {
    bot: Bot,
    /// Broadcast channel for new-event posts. Unset disables broadcasts.
    channel_id: Option<i64>,
}

impl TelegramDispatcher {
    #[must_use]
    pub fn new(bot: Bot, channel_id: Option<i64>) -> Self {
        Self { bot, channel_id }
    }
}

#[async_trait]
impl Dispatcher for TelegramDispatcher {
    async fn send_to_user(&self, user_id: i64, text: &str) -> bool {
        match self
            .bot
            .send_message(ChatId(user_id), text)
            .parse_mode(ParseMode::Html)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                error!(user_id, error = %e, "Failed to send notification");
                false
            }
        }
    }

    async fn send_to_channel(&self, text: &str) -> bool {
        let Some(channel_id) = self.channel_id else {
            return false;
        };

        match self
            .bot
            .send_message(ChatId(channel_id), text)
            .parse_mode(ParseMode::Html)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                error!(channel_id, error = %e, "Failed to send to channel");
                false
            }
        }
    }
}

/// Run the inbound command loop until shutdown (ctrl-c).
pub async fn run_command_listener(bot: Bot, control: Arc<BotControl>) {
    if let Err(e) = register_bot_commands(&bot).await {
        warn!(error = %e, "Failed to register bot commands with Telegram");
    }

    info!("Telegram command listener started");

    teloxide::repl(bot, move |bot: Bot, msg: Message| {
        let control = control.clone();
        async move {
            let Some(text) = msg.text() else {
                return respond(());
            };
            // Commands arrive in private chats, where the chat id is the
            // user's id.
            let user_id = msg.chat.id.0;

            let response = match parse_command(text) {
                Ok(command) => Some(control.execute(user_id, command).await),
                Err(CommandParseError::InvalidArgument(reason)) => Some(reason),
                // Plain chatter and unknown commands get no reply.
                Err(CommandParseError::NotACommand | CommandParseError::UnknownCommand(_)) => None,
            };

            if let Some(response) = response {
                if let Err(e) = bot
                    .send_message(msg.chat.id, response)
                    .parse_mode(ParseMode::Html)
                    .await
                {
                    error!(error = %e, "Failed to send command response");
                }
            }

            respond(())
        }
    })
    .await;
}

/// Register bot commands with Telegram for the "/" menu.
async fn register_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    let commands: Vec<TelegramBotCommand> = bot_commands()
        .into_iter()
        .map(|(cmd, desc)| TelegramBotCommand::new(cmd, desc))
        .collect();

    bot.set_my_commands(commands).await?;
    info!("Registered bot commands with Telegram");
    Ok(())
}
