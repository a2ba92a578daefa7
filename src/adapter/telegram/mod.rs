//! Telegram adapter: outbound dispatcher, command parsing and execution,
//! and message formatting.

pub mod command;
pub mod control;
pub mod format;
mod notifier;

pub use control::BotControl;
pub use notifier::{run_command_listener, TelegramDispatcher};
