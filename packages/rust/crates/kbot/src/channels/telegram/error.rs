use reqwest::StatusCode;

/// Failure of a Bot API call.
#[derive(Debug)]
pub struct TelegramApiError {
    pub status: Option<StatusCode>,
    pub error_code: Option<i64>,
    pub retry_after_secs: Option<u64>,
    pub body: String,
}

impl TelegramApiError {
    pub(super) fn from_reqwest(err: reqwest::Error) -> Self {
        let body = if err.is_timeout() {
            format!("timed out: {err}")
        } else {
            err.to_string()
        };
        Self {
            status: None,
            error_code: None,
            retry_after_secs: None,
            body,
        }
    }

    /// Credential rejected by the Bot API.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self.status,
            Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        ) || matches!(self.error_code, Some(401 | 403))
    }

    pub(super) fn is_conflict(&self) -> bool {
        self.status == Some(StatusCode::CONFLICT) || self.error_code == Some(409)
    }

    pub(super) fn is_rate_limited(&self) -> bool {
        self.status == Some(StatusCode::TOO_MANY_REQUESTS) || self.error_code == Some(429)
    }

    /// Validate a Bot API response and return its `result` payload.
    pub(super) async fn check_response(
        response: reqwest::Response,
    ) -> Result<serde_json::Value, Self> {
        let status = response.status();
        let body_text = response.text().await.unwrap_or_default();
        let parsed = serde_json::from_str::<serde_json::Value>(&body_text).ok();

        let ok = parsed
            .as_ref()
            .and_then(|data| data.get("ok"))
            .and_then(serde_json::Value::as_bool)
            .unwrap_or(status.is_success());
        if !status.is_success() || !ok {
            return Err(Self {
                status: Some(status),
                error_code: parsed.as_ref().and_then(telegram_api_error_code),
                retry_after_secs: parsed
                    .as_ref()
                    .and_then(telegram_api_error_retry_after_secs),
                body: parsed
                    .as_ref()
                    .map(|data| {
                        telegram_api_error_description(data, body_text.as_str()).to_string()
                    })
                    .unwrap_or(body_text),
            });
        }

        let Some(mut data) = parsed else {
            return Err(Self {
                status: Some(status),
                error_code: None,
                retry_after_secs: None,
                body: format!("failed to parse Telegram success response: {body_text}"),
            });
        };
        Ok(data
            .get_mut("result")
            .map(serde_json::Value::take)
            .unwrap_or(serde_json::Value::Null))
    }
}

impl std::fmt::Display for TelegramApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.status, self.error_code) {
            (Some(status), Some(code)) => {
                write!(f, "status={status}, error_code={code}, body={}", self.body)
            }
            (Some(status), None) => write!(f, "status={status}, body={}", self.body),
            (None, Some(code)) => write!(f, "error_code={code}, body={}", self.body),
            (None, None) => write!(f, "{}", self.body),
        }
    }
}

impl std::error::Error for TelegramApiError {}

pub(super) fn telegram_api_error_retry_after_secs(data: &serde_json::Value) -> Option<u64> {
    data.get("parameters")
        .and_then(|v| v.get("retry_after"))
        .and_then(serde_json::Value::as_u64)
}

pub(super) fn telegram_api_error_code(data: &serde_json::Value) -> Option<i64> {
    data.get("error_code").and_then(serde_json::Value::as_i64)
}

pub(super) fn telegram_api_error_description<'a>(
    data: &'a serde_json::Value,
    fallback: &'a str,
) -> &'a str {
    data.get("description")
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback)
}
