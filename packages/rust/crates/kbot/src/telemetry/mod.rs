//! Tracing and metric seams used by the router and the dispatcher.
//!
//! Components never read ambient tracing state: every span is opened from an
//! explicit [`TraceContext`] handed down by the caller, and the providers behind
//! [`CommandTracer`] / [`CommandMetrics`] are injected at construction time.

mod context;
mod otel;
mod providers;
mod span;

pub use context::TraceContext;
pub use otel::{OtelCommandMetrics, OtelCommandTracer, bridge_span};
pub use providers::{METER_NAME, TRACER_NAME, Telemetry, init_telemetry};
pub use span::{CommandMetrics, CommandSpan, CommandTracer, SpanGuard, SpanTags};
