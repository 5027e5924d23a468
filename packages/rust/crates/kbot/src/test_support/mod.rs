//! Recording doubles for the tracing, metric and reply seams.
//!
//! Used by integration tests to assert span lifecycle and counter behavior
//! without an OpenTelemetry pipeline.

mod metrics;
mod replier;
mod tracer;

pub use metrics::RecordingMetrics;
pub use replier::RecordingReplier;
pub use tracer::{RecordedSpan, RecordingTracer};
