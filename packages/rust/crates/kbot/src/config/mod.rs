//! Settings for the bot process: optional YAML file plus environment overrides.

mod endpoint;
mod settings;

pub use endpoint::{DEFAULT_OTLP_GRPC_PORT, normalize_collector_endpoint};
pub use settings::{
    DEFAULT_METRICS_INTERVAL_SECS, DEFAULT_POLL_TIMEOUT_SECS, IgnoredOverride, KbotSettings,
    LoadedSettings, SettingsError, ValidatedSettings, load_settings,
};
