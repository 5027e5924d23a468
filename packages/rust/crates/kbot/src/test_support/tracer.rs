use std::sync::{Arc, Mutex, PoisonError};

use opentelemetry::trace::{SpanId, TraceId};
use rand::Rng as _;

use crate::telemetry::{CommandSpan, CommandTracer, SpanTags, TraceContext};

/// Snapshot of one span opened through [`RecordingTracer`].
#[derive(Debug, Clone, Default)]
pub struct RecordedSpan {
    pub name: String,
    pub operation_name: String,
    pub trace_id: String,
    pub span_id: String,
    pub parent_span_id: Option<String>,
    pub tags: Vec<(String, String)>,
    pub logs: Vec<Vec<(String, String)>>,
    pub finish_count: usize,
}

impl RecordedSpan {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Tracer that records every span it opens.
#[derive(Clone, Default)]
pub struct RecordingTracer {
    spans: Arc<Mutex<Vec<RecordedSpan>>>,
}

impl RecordingTracer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spans(&self) -> Vec<RecordedSpan> {
        self.spans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn opened(&self) -> usize {
        self.spans.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Total `finish` calls across all spans.
    pub fn finished(&self) -> usize {
        self.spans
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|span| span.finish_count)
            .sum()
    }

    pub fn spans_named(&self, name: &str) -> Vec<RecordedSpan> {
        self.spans()
            .into_iter()
            .filter(|span| span.name == name)
            .collect()
    }

    fn update(&self, index: usize, apply: impl FnOnce(&mut RecordedSpan)) {
        let mut spans = self.spans.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(span) = spans.get_mut(index) {
            apply(span);
        }
    }
}

impl CommandTracer for RecordingTracer {
    fn start_span(
        &self,
        name: &str,
        parent: Option<&TraceContext>,
        tags: SpanTags,
    ) -> Box<dyn CommandSpan> {
        let mut rng = rand::thread_rng();
        let trace_id = parent.map_or_else(
            || TraceId::from_bytes(rng.r#gen::<u128>().max(1).to_be_bytes()),
            |parent| parent.trace_id,
        );
        let span_id = SpanId::from_bytes(rng.r#gen::<u64>().max(1).to_be_bytes());
        let context = TraceContext {
            trace_id,
            span_id,
            sampled: true,
        };

        let record = RecordedSpan {
            name: name.to_string(),
            operation_name: name.to_string(),
            trace_id: trace_id.to_string(),
            span_id: span_id.to_string(),
            parent_span_id: parent.map(|parent| parent.span_id.to_string()),
            tags: tags
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
            logs: Vec::new(),
            finish_count: 0,
        };
        let index = {
            let mut spans = self.spans.lock().unwrap_or_else(PoisonError::into_inner);
            spans.push(record);
            spans.len() - 1
        };

        Box::new(RecordingSpan {
            tracer: self.clone(),
            index,
            context,
        })
    }
}

struct RecordingSpan {
    tracer: RecordingTracer,
    index: usize,
    context: TraceContext,
}

impl CommandSpan for RecordingSpan {
    fn context(&self) -> TraceContext {
        self.context
    }

    fn set_operation_name(&mut self, name: &str) {
        self.tracer
            .update(self.index, |span| span.operation_name = name.to_string());
    }

    fn set_tag(&mut self, key: &'static str, value: String) {
        self.tracer
            .update(self.index, |span| span.tags.push((key.to_string(), value)));
    }

    fn log_fields(&mut self, fields: SpanTags) {
        let fields = fields
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect();
        self.tracer.update(self.index, |span| span.logs.push(fields));
    }

    fn finish(self: Box<Self>) {
        self.tracer
            .update(self.index, |span| span.finish_count += 1);
    }
}
