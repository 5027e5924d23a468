//! kbot: Telegram bot front end with traced, cancellable outbound dispatch.
//!
//! - **Router**: classifies inbound text into an intent, opens the command spans,
//!   replies, and counts one `kbot_command_<label>` metric per command.
//! - **Dispatcher**: for `/get`, sends the payload to the remote application on two
//!   racing paths (random-delay `GET`, first-tick `POST /post`), each under its own
//!   child span, and returns once both have terminated.

#![allow(missing_docs)]

pub mod channels;
pub mod config;
pub mod dispatch;
pub mod router;
pub mod runtime;
pub mod telemetry;
#[doc(hidden)]
pub mod test_support;

pub use channels::telegram::{BotIdentity, TelegramApiError, TelegramBot};
pub use config::{
    DEFAULT_METRICS_INTERVAL_SECS, DEFAULT_OTLP_GRPC_PORT, DEFAULT_POLL_TIMEOUT_SECS,
    IgnoredOverride, KbotSettings, LoadedSettings, SettingsError, ValidatedSettings,
    load_settings, normalize_collector_endpoint,
};
pub use dispatch::{DeliveryError, DeliveryPath, DispatchTiming, Dispatcher, PathOutcome};
pub use router::{
    COMMAND_SPAN_NAME, CommandRouter, HandledCommand, InboundCommand, Intent, ROOT_SPAN_NAME,
    Replier, Reply, ReplyMode, Sender, UNDEFINED_LABEL, classify,
};
pub use runtime::run_bot;
pub use telemetry::{
    CommandMetrics, CommandSpan, CommandTracer, SpanGuard, SpanTags, Telemetry, TraceContext,
    init_telemetry,
};

/// Version string reported in replies and telemetry resources.
pub fn app_version() -> String {
    format!("v{}", env!("CARGO_PKG_VERSION"))
}
