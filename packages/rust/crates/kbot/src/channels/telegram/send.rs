use async_trait::async_trait;

use crate::router::{Replier, Reply, ReplyMode};

use super::constants::TELEGRAM_MAX_MESSAGE_LENGTH;
use super::error::TelegramApiError;
use super::{BotIdentity, TelegramBot};

impl TelegramBot {
    /// `getMe`: verifies the bot credential.
    pub async fn get_me(&self) -> Result<BotIdentity, TelegramApiError> {
        let response = self
            .client
            .get(self.api_url("getMe"))
            .send()
            .await
            .map_err(TelegramApiError::from_reqwest)?;
        let result = TelegramApiError::check_response(response).await?;
        Ok(BotIdentity {
            id: result
                .get("id")
                .and_then(serde_json::Value::as_i64)
                .unwrap_or_default(),
            username: result
                .get("username")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string),
            first_name: result
                .get("first_name")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
    }

    /// `sendMessage` to `chat_id`, with HTML parse mode for rich replies.
    pub async fn send_reply(&self, chat_id: &str, reply: &Reply) -> Result<(), TelegramApiError> {
        let text_chars = reply.text.chars().count();
        if text_chars > TELEGRAM_MAX_MESSAGE_LENGTH {
            tracing::warn!(
                chars = text_chars,
                limit = TELEGRAM_MAX_MESSAGE_LENGTH,
                "Telegram reply exceeds message length limit"
            );
        }

        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": reply.text,
        });
        if reply.mode == ReplyMode::Html {
            body["parse_mode"] = serde_json::json!("HTML");
        }

        let response = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .send()
            .await
            .map_err(TelegramApiError::from_reqwest)?;
        TelegramApiError::check_response(response).await.map(|_| ())
    }
}

#[async_trait]
impl Replier for TelegramBot {
    async fn reply(&self, recipient: &str, reply: &Reply) -> anyhow::Result<()> {
        self.send_reply(recipient, reply)
            .await
            .map_err(|error| anyhow::anyhow!("Telegram sendMessage failed: {error}"))
    }
}
