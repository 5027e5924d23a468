use std::collections::HashMap;

use opentelemetry::Context;
use opentelemetry::propagation::TextMapPropagator as _;
use opentelemetry::trace::{
    SpanContext, SpanId, TraceContextExt as _, TraceFlags, TraceId, TraceState,
};
use opentelemetry_sdk::propagation::TraceContextPropagator;

/// Immutable identifiers of one span in a trace.
///
/// A context is only ever produced by opening a span; deriving a child never
/// touches the parent value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceContext {
    pub trace_id: TraceId,
    pub span_id: SpanId,
    pub sampled: bool,
}

impl TraceContext {
    /// Trace id rendered as 32 lowercase hex characters.
    pub fn trace_id_hex(&self) -> String {
        self.trace_id.to_string()
    }

    pub fn is_valid(&self) -> bool {
        self.trace_id != TraceId::INVALID && self.span_id != SpanId::INVALID
    }

    /// Remote-parent OpenTelemetry context pointing at this span.
    pub fn to_otel_context(&self) -> Context {
        let flags = if self.sampled {
            TraceFlags::SAMPLED
        } else {
            TraceFlags::default()
        };
        Context::new().with_remote_span_context(SpanContext::new(
            self.trace_id,
            self.span_id,
            flags,
            true,
            TraceState::default(),
        ))
    }

    pub(crate) fn from_span_context(span_context: &SpanContext) -> Self {
        Self {
            trace_id: span_context.trace_id(),
            span_id: span_context.span_id(),
            sampled: span_context.is_sampled(),
        }
    }

    /// W3C trace-context headers (`traceparent`, `tracestate`) for outbound requests.
    pub fn http_headers(&self) -> HashMap<String, String> {
        let mut carrier = HashMap::new();
        TraceContextPropagator::new().inject_context(&self.to_otel_context(), &mut carrier);
        carrier
    }
}

#[cfg(test)]
#[path = "../../tests/unit/telemetry_context.rs"]
mod tests;
