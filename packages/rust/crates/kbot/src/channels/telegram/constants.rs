/// Telegram's maximum message length for text messages.
pub const TELEGRAM_MAX_MESSAGE_LENGTH: usize = 4096;
/// Public Bot API base URL.
pub const TELEGRAM_DEFAULT_API_BASE: &str = "https://api.telegram.org";

pub(super) const TELEGRAM_POLL_RETRY_SECS: u64 = 5;
pub(super) const TELEGRAM_POLL_CONFLICT_RETRY_SECS: u64 = 2;
pub(super) const TELEGRAM_POLL_DEFAULT_RATE_LIMIT_RETRY_SECS: u64 = 1;
pub(super) const TELEGRAM_POLL_MAX_RATE_LIMIT_RETRY_SECS: u64 = 60;
pub(super) const TELEGRAM_HTTP_CONNECT_TIMEOUT_SECS: u64 = 10;
/// Added on top of the long-poll timeout for the request deadline.
pub(super) const TELEGRAM_HTTP_REQUEST_SLACK_SECS: u64 = 20;
