//! Telegram Bot API transport: long-poll receive, `sendMessage` replies.

mod bot;
mod client;
mod constants;
mod error;
mod listen;
mod parsing;
mod send;

pub use bot::{BotIdentity, TelegramBot};
pub use constants::{TELEGRAM_DEFAULT_API_BASE, TELEGRAM_MAX_MESSAGE_LENGTH};
pub use error::TelegramApiError;
