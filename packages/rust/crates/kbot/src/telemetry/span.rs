use super::TraceContext;

/// Semantic tags attached when a span is opened.
pub type SpanTags = Vec<(&'static str, String)>;

/// One open span. Closing consumes the span, so it cannot be finished twice.
pub trait CommandSpan: Send {
    fn context(&self) -> TraceContext;

    fn set_operation_name(&mut self, name: &str);

    fn set_tag(&mut self, key: &'static str, value: String);

    /// Attach a structured log record to the span.
    fn log_fields(&mut self, fields: SpanTags);

    fn finish(self: Box<Self>);
}

/// Span factory. Implementations must be safe to share across concurrent commands.
pub trait CommandTracer: Send + Sync {
    /// Open a span; `parent: None` starts a new trace.
    fn start_span(
        &self,
        name: &str,
        parent: Option<&TraceContext>,
        tags: SpanTags,
    ) -> Box<dyn CommandSpan>;
}

/// Process-wide command counters, one per label, created on first use.
pub trait CommandMetrics: Send + Sync {
    fn increment(&self, label: &str);
}

/// Owns a [`CommandSpan`] and closes it exactly once.
///
/// [`SpanGuard::finish`] closes the span explicitly; any other exit path
/// (early return, cancellation, panic unwinding) closes it on drop.
pub struct SpanGuard {
    span: Option<Box<dyn CommandSpan>>,
    context: TraceContext,
}

impl SpanGuard {
    pub fn new(span: Box<dyn CommandSpan>) -> Self {
        let context = span.context();
        Self {
            span: Some(span),
            context,
        }
    }

    pub fn open(
        tracer: &dyn CommandTracer,
        name: &str,
        parent: Option<&TraceContext>,
        tags: SpanTags,
    ) -> Self {
        Self::new(tracer.start_span(name, parent, tags))
    }

    pub fn context(&self) -> TraceContext {
        self.context
    }

    pub fn set_operation_name(&mut self, name: &str) {
        if let Some(span) = self.span.as_mut() {
            span.set_operation_name(name);
        }
    }

    pub fn set_tag(&mut self, key: &'static str, value: impl Into<String>) {
        if let Some(span) = self.span.as_mut() {
            span.set_tag(key, value.into());
        }
    }

    pub fn log_fields(&mut self, fields: SpanTags) {
        if let Some(span) = self.span.as_mut() {
            span.log_fields(fields);
        }
    }

    pub fn finish(mut self) {
        self.close();
    }

    fn close(&mut self) {
        if let Some(span) = self.span.take() {
            span.finish();
        }
    }
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        self.close();
    }
}
