use std::time::Duration;

use super::constants::{TELEGRAM_HTTP_CONNECT_TIMEOUT_SECS, TELEGRAM_HTTP_REQUEST_SLACK_SECS};

pub(super) fn build_telegram_http_client(poll_timeout: Duration) -> reqwest::Client {
    let request_timeout = poll_timeout + Duration::from_secs(TELEGRAM_HTTP_REQUEST_SLACK_SECS);
    match reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(TELEGRAM_HTTP_CONNECT_TIMEOUT_SECS))
        .timeout(request_timeout)
        .build()
    {
        Ok(client) => client,
        Err(error) => {
            tracing::warn!(
                error = %error,
                "Failed to build Telegram HTTP client with timeouts; falling back to default client"
            );
            reqwest::Client::new()
        }
    }
}
