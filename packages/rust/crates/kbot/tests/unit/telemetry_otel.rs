use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use opentelemetry::metrics::MeterProvider as _;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::export::trace::{ExportResult, SpanData, SpanExporter};
use opentelemetry_sdk::metrics::data::{ResourceMetrics, Sum, Temporality};
use opentelemetry_sdk::metrics::reader::{AggregationSelector, MetricReader, TemporalitySelector};
use opentelemetry_sdk::metrics::{
    Aggregation, InstrumentKind, ManualReader, Pipeline, SdkMeterProvider,
};
use opentelemetry_sdk::trace::TracerProvider;

use super::{CommandMetrics, CommandTracer, OtelCommandMetrics, OtelCommandTracer};

#[derive(Debug, Clone, Default)]
struct CollectingExporter {
    spans: Arc<Mutex<Vec<SpanData>>>,
}

impl CollectingExporter {
    fn finished(&self) -> Vec<SpanData> {
        self.spans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl SpanExporter for CollectingExporter {
    fn export(
        &mut self,
        batch: Vec<SpanData>,
    ) -> Pin<Box<dyn Future<Output = ExportResult> + Send + 'static>> {
        self.spans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend(batch);
        Box::pin(std::future::ready(Ok(())))
    }
}

/// Lets the test keep a handle on the reader it registers with the provider.
#[derive(Debug, Clone)]
struct SharedReader(Arc<ManualReader>);

impl AggregationSelector for SharedReader {
    fn aggregation(&self, kind: InstrumentKind) -> Aggregation {
        self.0.aggregation(kind)
    }
}

impl TemporalitySelector for SharedReader {
    fn temporality(&self, kind: InstrumentKind) -> Temporality {
        self.0.temporality(kind)
    }
}

impl MetricReader for SharedReader {
    fn register_pipeline(&self, pipeline: Weak<Pipeline>) {
        self.0.register_pipeline(pipeline);
    }

    fn collect(&self, rm: &mut ResourceMetrics) -> opentelemetry::metrics::Result<()> {
        self.0.collect(rm)
    }

    fn force_flush(&self) -> opentelemetry::metrics::Result<()> {
        self.0.force_flush()
    }

    fn shutdown(&self) -> opentelemetry::metrics::Result<()> {
        self.0.shutdown()
    }
}

fn counter_value(metrics: &ResourceMetrics, name: &str) -> Option<u64> {
    let mut matches = metrics
        .scope_metrics
        .iter()
        .flat_map(|scope| scope.metrics.iter())
        .filter(|metric| metric.name == name);
    let metric = matches.next()?;
    assert!(matches.next().is_none(), "duplicate counter {name}");
    let sum = metric.data.as_any().downcast_ref::<Sum<u64>>()?;
    Some(sum.data_points.iter().map(|point| point.value).sum())
}

#[test]
fn command_span_is_renamed_logged_and_parented() {
    let exporter = CollectingExporter::default();
    let provider = TracerProvider::builder()
        .with_simple_exporter(exporter.clone())
        .build();
    let tracer = OtelCommandTracer::new(provider.tracer("kbot_tracer"));

    let root = tracer.start_span("start_span", None, vec![("component", "kbot".to_string())]);
    let root_context = root.context();
    let mut command = tracer.start_span("command", Some(&root_context), Vec::new());
    command.set_operation_name("command: get");
    command.set_tag("peer.service", "get-kbot-message".to_string());
    command.log_fields(vec![
        ("event", "start kbot answer".to_string()),
        ("value", "xyz".to_string()),
    ]);
    command.log_fields(vec![("payload", "xyz".to_string())]);
    let command_context = command.context();
    command.finish();
    root.finish();
    for result in provider.force_flush() {
        assert!(result.is_ok(), "{result:?}");
    }

    let spans = exporter.finished();
    assert_eq!(spans.len(), 2, "{spans:?}");
    let Some(child) = spans
        .iter()
        .find(|span| span.span_context.span_id() == command_context.span_id)
    else {
        panic!("command span was not exported: {spans:?}");
    };
    assert_eq!(child.name, "command: get");
    assert_eq!(child.parent_span_id, root_context.span_id);
    assert_eq!(child.span_context.trace_id(), root_context.trace_id);
    assert!(
        child
            .attributes
            .iter()
            .any(|kv| kv.key.as_str() == "peer.service"
                && kv.value.as_str() == "get-kbot-message")
    );
    let events: Vec<String> = child.events.iter().map(|event| event.name.to_string()).collect();
    assert_eq!(events, vec!["start kbot answer".to_string(), "log".to_string()]);
    assert_eq!(child.events[0].attributes.len(), 2);
}

#[test]
fn command_counters_are_created_once_per_label() {
    let reader = SharedReader(Arc::new(ManualReader::builder().build()));
    let provider = SdkMeterProvider::builder()
        .with_reader(reader.clone())
        .build();
    let metrics = OtelCommandMetrics::new(provider.meter("kbot"));

    metrics.increment("get");
    metrics.increment("get");
    metrics.increment("hello");

    let mut collected = ResourceMetrics {
        resource: Resource::empty(),
        scope_metrics: Vec::new(),
    };
    assert!(reader.collect(&mut collected).is_ok());
    assert_eq!(counter_value(&collected, "kbot_command_get"), Some(2));
    assert_eq!(counter_value(&collected, "kbot_command_hello"), Some(1));
    assert_eq!(counter_value(&collected, "kbot_command_ding"), None);
    assert_eq!(
        metrics
            .counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len(),
        2
    );
}
