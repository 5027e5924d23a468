use std::time::Duration;

use tokio::sync::mpsc;

use crate::router::InboundCommand;

use super::TelegramBot;
use super::constants::{
    TELEGRAM_POLL_CONFLICT_RETRY_SECS, TELEGRAM_POLL_DEFAULT_RATE_LIMIT_RETRY_SECS,
    TELEGRAM_POLL_MAX_RATE_LIMIT_RETRY_SECS, TELEGRAM_POLL_RETRY_SECS,
};
use super::error::TelegramApiError;

impl TelegramBot {
    /// Long-poll `getUpdates` and forward text messages to `tx`.
    ///
    /// Fails fast when the credential is rejected; returns `Ok(())` once the
    /// receiving side is gone.
    pub async fn listen(&self, tx: mpsc::Sender<InboundCommand>) -> anyhow::Result<()> {
        let mut offset: i64 = 0;
        tracing::info!("Telegram bot listening for messages...");
        loop {
            let body = serde_json::json!({
                "offset": offset,
                "timeout": self.poll_timeout.as_secs(),
                "allowed_updates": ["message"]
            });
            let result = match self
                .client
                .post(self.api_url("getUpdates"))
                .json(&body)
                .send()
                .await
            {
                Ok(response) => TelegramApiError::check_response(response).await,
                Err(error) => Err(TelegramApiError::from_reqwest(error)),
            };

            let updates = match result {
                Ok(updates) => updates,
                Err(error) if error.is_unauthorized() => {
                    anyhow::bail!("Telegram getUpdates rejected the bot credential: {error}");
                }
                Err(error) => {
                    let delay = poll_retry_delay(&error);
                    tracing::warn!(
                        error = %error,
                        retry_in_secs = delay.as_secs(),
                        "Telegram getUpdates failed; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    continue;
                }
            };

            let Some(updates) = updates.as_array() else {
                tracing::warn!(
                    result = %updates,
                    retry_in_secs = TELEGRAM_POLL_RETRY_SECS,
                    "Telegram getUpdates returned a non-array result; retrying"
                );
                tokio::time::sleep(Duration::from_secs(TELEGRAM_POLL_RETRY_SECS)).await;
                continue;
            };
            for update in updates {
                if let Some(uid) = update.get("update_id").and_then(serde_json::Value::as_i64) {
                    offset = uid + 1;
                }
                let Some(command) = Self::parse_update_message(update) else {
                    continue;
                };
                if tx.send(command).await.is_err() {
                    return Ok(());
                }
            }
        }
    }
}

fn poll_retry_delay(error: &TelegramApiError) -> Duration {
    if error.is_conflict() {
        tracing::warn!(
            "Telegram polling conflict (409). Ensure only one process is using this bot token."
        );
        return Duration::from_secs(TELEGRAM_POLL_CONFLICT_RETRY_SECS);
    }
    if error.is_rate_limited() {
        let secs = error
            .retry_after_secs
            .unwrap_or(TELEGRAM_POLL_DEFAULT_RATE_LIMIT_RETRY_SECS)
            .clamp(1, TELEGRAM_POLL_MAX_RATE_LIMIT_RETRY_SECS);
        return Duration::from_secs(secs);
    }
    Duration::from_secs(TELEGRAM_POLL_RETRY_SECS)
}
