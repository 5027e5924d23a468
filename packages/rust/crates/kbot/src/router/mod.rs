//! Command router: classifies inbound text, drives the span lifecycle, replies,
//! and counts one metric per handled command.

mod command;
mod intent;
mod replies;

use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use tracing::Instrument as _;

use crate::dispatch::Dispatcher;
use crate::telemetry::{CommandMetrics, CommandTracer, SpanGuard, TraceContext, bridge_span};

pub use command::{InboundCommand, Replier, Reply, ReplyMode, Sender, extract_payload};
pub use intent::{Intent, UNDEFINED_LABEL, classify};

/// Root span opened for every inbound command.
pub const ROOT_SPAN_NAME: &str = "message_handler";
/// Child span annotated with the command and used as parent for dispatch spans.
pub const COMMAND_SPAN_NAME: &str = "start_span";

const COMPONENT: &str = "kbot";

/// Result of handling one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandledCommand {
    pub intent: Intent,
    /// `None` when the command was unclassified and nothing was sent.
    pub reply: Option<Reply>,
}

pub struct CommandRouter {
    tracer: Arc<dyn CommandTracer>,
    metrics: Arc<dyn CommandMetrics>,
    dispatcher: Dispatcher,
    version: String,
}

impl CommandRouter {
    pub fn new(
        tracer: Arc<dyn CommandTracer>,
        metrics: Arc<dyn CommandMetrics>,
        dispatcher: Dispatcher,
        version: impl Into<String>,
    ) -> Self {
        Self {
            tracer,
            metrics,
            dispatcher,
            version: version.into(),
        }
    }

    /// Handle one inbound command end to end.
    ///
    /// Reply-send failures are returned to the caller; spans are closed and the
    /// command counter is incremented regardless.
    pub async fn handle(
        &self,
        inbound: &InboundCommand,
        replier: &dyn Replier,
    ) -> anyhow::Result<HandledCommand> {
        let mut root = SpanGuard::open(
            self.tracer.as_ref(),
            ROOT_SPAN_NAME,
            None,
            vec![("component", COMPONENT.to_string())],
        );
        let trace_id = root.context().trace_id_hex();
        root.set_tag("trace_id", trace_id.clone());

        let root_context = root.context();
        let mut span = SpanGuard::open(
            self.tracer.as_ref(),
            COMMAND_SPAN_NAME,
            Some(&root_context),
            Vec::new(),
        );

        tracing::info!(
            text = %inbound.text,
            payload = %inbound.payload,
            sender = %inbound.sender.id,
            "Income message"
        );
        tracing::info!(trace_id = %trace_id, "OpenTelemetry traceID");

        let intent = classify(&inbound.payload, &inbound.text);
        annotate_start(&mut span, intent);

        let command_context = span.context();
        let reply = self
            .build_reply(intent, inbound, &command_context, &trace_id)
            .instrument(bridge_span(intent.label(), &command_context))
            .await;

        let send_result = match reply.as_ref() {
            Some(reply) => replier.reply(&inbound.recipient, reply).await,
            None => Ok(()),
        };

        self.metrics.increment(intent.label());

        span.log_fields(vec![
            ("event", "end kbot answer".to_string()),
            ("end time", Local::now().to_rfc3339()),
        ]);
        span.finish();
        root.finish();

        send_result?;
        Ok(HandledCommand { intent, reply })
    }

    async fn build_reply(
        &self,
        intent: Intent,
        inbound: &InboundCommand,
        command_context: &TraceContext,
        trace_id: &str,
    ) -> Option<Reply> {
        match intent {
            Intent::Hello => Some(replies::hello(&inbound.sender.first_name, &self.version)),
            Intent::Start => Some(replies::start_usage()),
            Intent::Help => Some(replies::help()),
            Intent::Ding => Some(replies::ding()),
            Intent::Usage => Some(replies::short_usage()),
            Intent::Get => Some(
                self.timed_dispatch(&inbound.payload, command_context, trace_id)
                    .await,
            ),
            Intent::Unclassified => {
                tracing::debug!(text = %inbound.text, "unclassified command; no reply");
                None
            }
        }
    }

    async fn timed_dispatch(
        &self,
        payload: &str,
        command_context: &TraceContext,
        trace_id: &str,
    ) -> Reply {
        let started_at = Local::now();
        let started = Instant::now();
        self.dispatcher.dispatch(payload, command_context).await;
        let elapsed = started.elapsed();
        let finished_at = Local::now();
        tracing::info!(
            elapsed_ms = elapsed.as_millis(),
            trace_id,
            "dispatch finished"
        );
        replies::dispatch_timing(started_at, finished_at, elapsed, trace_id)
    }
}

fn annotate_start(span: &mut SpanGuard, intent: Intent) {
    let label = intent.label();
    span.set_operation_name(&format!("command: {label}"));
    span.log_fields(vec![
        ("event", "start kbot answer".to_string()),
        ("type", label.to_string()),
        ("start time", Local::now().to_rfc3339()),
    ]);
    span.set_tag("peer.service", format!("{label}-kbot-message"));
    span.set_tag("component", format!("{label}-kbot-message-handler"));
    span.set_tag("span.kind", "client");
}

#[cfg(test)]
#[path = "../../tests/unit/router_replies.rs"]
mod tests;
