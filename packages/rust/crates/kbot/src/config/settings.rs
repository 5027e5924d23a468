//! Runtime settings loader for kbot.
//!
//! Loads and merges:
//! - Optional YAML file passed with `--config`
//! - Environment overrides (`TELE_TOKEN`, `APP_URL`, `METRICS_HOST`, `TRACES_HOST`, ...)
//!
//! Merge precedence is environment over file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;

use super::endpoint::normalize_collector_endpoint;

/// Default export interval for the metrics periodic reader.
pub const DEFAULT_METRICS_INTERVAL_SECS: u64 = 10;
/// Default `getUpdates` long-poll timeout.
pub const DEFAULT_POLL_TIMEOUT_SECS: u64 = 10;

const ENV_TELEGRAM_TOKEN: &str = "TELE_TOKEN";
const ENV_APP_URL: &str = "APP_URL";
const ENV_METRICS_HOST: &str = "METRICS_HOST";
const ENV_TRACES_HOST: &str = "TRACES_HOST";
const ENV_METRICS_INTERVAL_SECS: &str = "KBOT_METRICS_INTERVAL_SECS";
const ENV_TELEGRAM_API_BASE_URL: &str = "KBOT_TELEGRAM_API_BASE_URL";
const ENV_POLL_TIMEOUT_SECS: &str = "KBOT_POLL_TIMEOUT_SECS";

/// Raw settings as read from file and environment.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KbotSettings {
    pub telegram_token: Option<String>,
    pub app_url: Option<String>,
    pub metrics_host: Option<String>,
    pub traces_host: Option<String>,
    pub metrics_interval_secs: Option<u64>,
    pub telegram_api_base_url: Option<String>,
    pub poll_timeout_secs: Option<u64>,
}

/// Checked settings used by the running process.
#[derive(Debug, Clone)]
pub struct ValidatedSettings {
    pub telegram_token: String,
    pub app_url: Url,
    /// Normalized `http://host:port` endpoint, `None` when metrics export is disabled.
    pub metrics_endpoint: Option<String>,
    /// Normalized `http://host:port` endpoint, `None` when trace export is disabled.
    pub traces_endpoint: Option<String>,
    pub metrics_interval: Duration,
    pub telegram_api_base_url: Option<String>,
    pub poll_timeout: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("bot credential is missing; set TELE_TOKEN")]
    MissingToken,
    #[error("bot credential is malformed; expected `<bot id>:<secret>`")]
    MalformedToken,
    #[error("remote application URL is missing; set APP_URL")]
    MissingAppUrl,
    #[error("remote application URL `{value}` is invalid: {reason}")]
    InvalidAppUrl { value: String, reason: String },
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Environment override that was present but could not be applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoredOverride {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

/// Settings plus the overrides dropped while loading them.
///
/// Loading runs before the log subscriber exists, so callers report
/// `ignored` once logging is up.
#[derive(Debug, Clone, Default)]
pub struct LoadedSettings {
    pub settings: KbotSettings,
    pub ignored: Vec<IgnoredOverride>,
}

impl LoadedSettings {
    pub fn log_ignored(&self) {
        for ignored in &self.ignored {
            tracing::warn!(
                key = ignored.key,
                value = %ignored.value,
                reason = %ignored.reason,
                "ignoring invalid settings override"
            );
        }
    }
}

/// Load settings from an optional YAML file, then apply process environment overrides.
pub fn load_settings(path: Option<&Path>) -> Result<LoadedSettings, SettingsError> {
    let mut settings = match path {
        Some(path) => KbotSettings::from_yaml_file(path)?,
        None => KbotSettings::default(),
    };
    let ignored = settings.apply_env_with(|key| std::env::var(key).ok());
    Ok(LoadedSettings { settings, ignored })
}

impl KbotSettings {
    pub fn from_yaml_file(path: &Path) -> Result<Self, SettingsError> {
        let raw = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&raw).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    /// Apply overrides from `lookup`; blank values are skipped.
    ///
    /// Returns the overrides that were set but unparsable.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Vec<IgnoredOverride>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(value) = non_blank(ENV_TELEGRAM_TOKEN) {
            self.telegram_token = Some(value);
        }
        if let Some(value) = non_blank(ENV_APP_URL) {
            self.app_url = Some(value);
        }
        if let Some(value) = non_blank(ENV_METRICS_HOST) {
            self.metrics_host = Some(value);
        }
        if let Some(value) = non_blank(ENV_TRACES_HOST) {
            self.traces_host = Some(value);
        }
        if let Some(value) = non_blank(ENV_TELEGRAM_API_BASE_URL) {
            self.telegram_api_base_url = Some(value);
        }

        let mut ignored = Vec::new();
        let mut parse_secs = |key: &'static str, target: &mut Option<u64>| {
            let Some(value) = non_blank(key) else {
                return;
            };
            match value.parse::<u64>() {
                Ok(secs) => *target = Some(secs),
                Err(error) => ignored.push(IgnoredOverride {
                    key,
                    value,
                    reason: error.to_string(),
                }),
            }
        };
        parse_secs(ENV_METRICS_INTERVAL_SECS, &mut self.metrics_interval_secs);
        parse_secs(ENV_POLL_TIMEOUT_SECS, &mut self.poll_timeout_secs);
        ignored
    }

    pub fn validate(&self) -> Result<ValidatedSettings, SettingsError> {
        let telegram_token = self
            .telegram_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(SettingsError::MissingToken)?;
        if !is_well_formed_bot_token(telegram_token) {
            return Err(SettingsError::MalformedToken);
        }

        let raw_app_url = self
            .app_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or(SettingsError::MissingAppUrl)?;
        let app_url = Url::parse(raw_app_url).map_err(|error| SettingsError::InvalidAppUrl {
            value: raw_app_url.to_string(),
            reason: error.to_string(),
        })?;
        if !matches!(app_url.scheme(), "http" | "https") {
            return Err(SettingsError::InvalidAppUrl {
                value: raw_app_url.to_string(),
                reason: format!("unsupported scheme `{}`", app_url.scheme()),
            });
        }

        Ok(ValidatedSettings {
            telegram_token: telegram_token.to_string(),
            app_url,
            metrics_endpoint: self
                .metrics_host
                .as_deref()
                .and_then(normalize_collector_endpoint),
            traces_endpoint: self
                .traces_host
                .as_deref()
                .and_then(normalize_collector_endpoint),
            metrics_interval: Duration::from_secs(
                self.metrics_interval_secs
                    .unwrap_or(DEFAULT_METRICS_INTERVAL_SECS)
                    .max(1),
            ),
            telegram_api_base_url: self
                .telegram_api_base_url
                .as_deref()
                .map(str::trim)
                .filter(|url| !url.is_empty())
                .map(str::to_string),
            poll_timeout: Duration::from_secs(
                self.poll_timeout_secs.unwrap_or(DEFAULT_POLL_TIMEOUT_SECS),
            ),
        })
    }
}

fn is_well_formed_bot_token(token: &str) -> bool {
    match token.split_once(':') {
        Some((bot_id, secret)) => {
            !bot_id.is_empty()
                && bot_id.bytes().all(|b| b.is_ascii_digit())
                && !secret.is_empty()
                && !secret.chars().any(char::is_whitespace)
        }
        None => false,
    }
}
