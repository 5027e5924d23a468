use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use opentelemetry::metrics::{Counter, Meter};
use opentelemetry::trace::{Span as _, Tracer as _};
use opentelemetry::{Context, KeyValue};
use opentelemetry_sdk::trace::{Span as SdkSpan, Tracer as SdkTracer};
use tracing_opentelemetry::OpenTelemetrySpanExt as _;

use super::{CommandMetrics, CommandSpan, CommandTracer, SpanTags, TraceContext};

/// Counter name prefix; the full name is `kbot_command_<label>`.
const COMMAND_COUNTER_PREFIX: &str = "kbot_command";

/// [`CommandTracer`] backed by an OpenTelemetry SDK tracer.
#[derive(Clone)]
pub struct OtelCommandTracer {
    tracer: SdkTracer,
}

impl OtelCommandTracer {
    pub fn new(tracer: SdkTracer) -> Self {
        Self { tracer }
    }
}

impl CommandTracer for OtelCommandTracer {
    fn start_span(
        &self,
        name: &str,
        parent: Option<&TraceContext>,
        tags: SpanTags,
    ) -> Box<dyn CommandSpan> {
        let parent_context = parent.map_or_else(Context::new, TraceContext::to_otel_context);
        let mut builder = self.tracer.span_builder(name.to_string());
        builder.attributes = Some(
            tags.into_iter()
                .map(|(key, value)| KeyValue::new(key, value))
                .collect(),
        );
        let span = self.tracer.build_with_context(builder, &parent_context);
        Box::new(OtelCommandSpan { span })
    }
}

struct OtelCommandSpan {
    span: SdkSpan,
}

impl CommandSpan for OtelCommandSpan {
    fn context(&self) -> TraceContext {
        TraceContext::from_span_context(self.span.span_context())
    }

    fn set_operation_name(&mut self, name: &str) {
        self.span.update_name(name.to_string());
    }

    fn set_tag(&mut self, key: &'static str, value: String) {
        self.span.set_attribute(KeyValue::new(key, value));
    }

    fn log_fields(&mut self, fields: SpanTags) {
        let event_name = fields
            .iter()
            .find(|(key, _)| *key == "event")
            .map_or_else(|| "log".to_string(), |(_, value)| value.clone());
        let attributes = fields
            .into_iter()
            .map(|(key, value)| KeyValue::new(key, value))
            .collect();
        self.span.add_event(event_name, attributes);
    }

    fn finish(self: Box<Self>) {
        let Self { mut span } = *self;
        span.end();
    }
}

/// [`CommandMetrics`] backed by an OpenTelemetry meter.
pub struct OtelCommandMetrics {
    meter: Meter,
    counters: Mutex<HashMap<String, Counter<u64>>>,
}

impl OtelCommandMetrics {
    pub fn new(meter: Meter) -> Self {
        Self {
            meter,
            counters: Mutex::new(HashMap::new()),
        }
    }
}

impl CommandMetrics for OtelCommandMetrics {
    fn increment(&self, label: &str) {
        let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
        let counter = counters.entry(label.to_string()).or_insert_with(|| {
            tracing::debug!(label, "creating command counter");
            self.meter
                .u64_counter(format!("{COMMAND_COUNTER_PREFIX}_{label}"))
                .init()
        });
        counter.add(1, &[]);
    }
}

/// `tracing` span whose OpenTelemetry parent is `parent`.
///
/// Log events recorded inside it are exported under the command trace when the
/// `tracing-opentelemetry` layer is installed; otherwise it is a plain span.
pub fn bridge_span(intent: &str, parent: &TraceContext) -> tracing::Span {
    let span = tracing::info_span!(
        "kbot_command",
        intent,
        trace_id = %parent.trace_id_hex()
    );
    span.set_parent(parent.to_otel_context());
    span
}

#[cfg(test)]
#[path = "../../tests/unit/telemetry_otel.rs"]
mod tests;
