use crate::router::{InboundCommand, Sender};

use super::TelegramBot;

impl TelegramBot {
    /// Convert one `getUpdates` entry into a command; non-text updates are skipped.
    pub(super) fn parse_update_message(update: &serde_json::Value) -> Option<InboundCommand> {
        let message = update.get("message")?;
        let text = message.get("text").and_then(serde_json::Value::as_str)?;
        let chat_id = message
            .get("chat")
            .and_then(|chat| chat.get("id"))
            .and_then(serde_json::Value::as_i64)?;

        let from = message.get("from");
        let user_id = from
            .and_then(|f| f.get("id"))
            .and_then(serde_json::Value::as_i64)
            .map(|id| id.to_string());
        let username = from
            .and_then(|f| f.get("username"))
            .and_then(serde_json::Value::as_str)
            .map(str::to_string);
        let first_name = from
            .and_then(|f| f.get("first_name"))
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string();

        let message_id = message
            .get("message_id")
            .and_then(serde_json::Value::as_i64)
            .unwrap_or_default();
        let sender = Sender {
            id: user_id
                .or_else(|| username.clone())
                .unwrap_or_else(|| "unknown".to_string()),
            username,
            first_name,
        };

        Some(InboundCommand::from_text(
            format!("telegram_{chat_id}_{message_id}"),
            chat_id.to_string(),
            sender,
            text,
        ))
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/telegram_parsing.rs"]
mod tests;
