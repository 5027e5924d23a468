use std::time::Duration;

use super::client::build_telegram_http_client;
use super::constants::TELEGRAM_DEFAULT_API_BASE;

/// Telegram bot: long-polls the Bot API for updates and sends replies.
pub struct TelegramBot {
    pub(super) bot_token: String,
    pub(super) api_base_url: String,
    pub(super) poll_timeout: Duration,
    pub(super) client: reqwest::Client,
}

/// Bot account returned by `getMe`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: String,
}

impl TelegramBot {
    /// Create a bot against the public Bot API.
    pub fn new(bot_token: String, poll_timeout: Duration) -> Self {
        Self::new_with_base_url(bot_token, TELEGRAM_DEFAULT_API_BASE.to_string(), poll_timeout)
    }

    /// Create a bot with a custom API base URL (useful for tests/proxies).
    pub fn new_with_base_url(bot_token: String, api_base_url: String, poll_timeout: Duration) -> Self {
        let client = build_telegram_http_client(poll_timeout);
        Self {
            bot_token,
            api_base_url,
            poll_timeout,
            client,
        }
    }

    pub(super) fn api_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{method}",
            self.api_base_url.trim_end_matches('/'),
            self.bot_token
        )
    }
}
