#![allow(missing_docs)]

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::Router;
use axum::extract::{Form, State};
use axum::routing::{get, post};
use kbot::test_support::{RecordingMetrics, RecordingReplier, RecordingTracer};
use kbot::{
    COMMAND_SPAN_NAME, CommandRouter, DispatchTiming, Dispatcher, InboundCommand, Intent,
    ROOT_SPAN_NAME, ReplyMode, Sender, UNDEFINED_LABEL, classify,
};
use tokio::sync::Mutex;

struct Harness {
    router: CommandRouter,
    tracer: RecordingTracer,
    metrics: RecordingMetrics,
}

fn harness() -> Harness {
    // Nothing listens on the discard port; dispatch failures stay internal.
    harness_with_endpoint("http://127.0.0.1:9")
}

fn harness_with_endpoint(endpoint: &str) -> Harness {
    let tracer = RecordingTracer::new();
    let metrics = RecordingMetrics::new();
    let dispatcher = Dispatcher::new(
        reqwest::Client::new(),
        endpoint,
        Arc::new(tracer.clone()),
    )
    .with_timing(DispatchTiming {
        max_jitter: Duration::from_millis(5),
        tick_period: Duration::from_millis(5),
    });
    let router = CommandRouter::new(
        Arc::new(tracer.clone()),
        Arc::new(metrics.clone()),
        dispatcher,
        "v1.2.3",
    );
    Harness {
        router,
        tracer,
        metrics,
    }
}

fn command(text: &str) -> InboundCommand {
    InboundCommand::from_text(
        "telegram_42_1",
        "42",
        Sender {
            id: "7".to_string(),
            username: Some("alice".to_string()),
            first_name: "Alice".to_string(),
        },
        text,
    )
}

#[derive(Clone, Default)]
struct AppMockState {
    pings: Arc<Mutex<usize>>,
    posted: Arc<Mutex<Vec<String>>>,
}

async fn handle_ping(State(state): State<AppMockState>) -> &'static str {
    *state.pings.lock().await += 1;
    "ok"
}

async fn handle_post(
    State(state): State<AppMockState>,
    Form(form): Form<HashMap<String, String>>,
) -> &'static str {
    state
        .posted
        .lock()
        .await
        .push(form.get("text").cloned().unwrap_or_default());
    "ok"
}

async fn spawn_mock_app() -> Result<Option<(String, AppMockState, tokio::task::JoinHandle<()>)>> {
    let state = AppMockState::default();
    let app = Router::new()
        .route("/", get(handle_ping))
        .route("/post", post(handle_post))
        .with_state(state.clone());
    let listener = match tokio::net::TcpListener::bind("127.0.0.1:0").await {
        Ok(listener) => listener,
        Err(err) if err.kind() == std::io::ErrorKind::PermissionDenied => {
            eprintln!("skipping router dispatch test: local socket bind is not permitted");
            return Ok(None);
        }
        Err(err) => return Err(err.into()),
    };
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(Some((format!("http://{addr}"), state, handle)))
}

fn assert_spans_balanced(tracer: &RecordingTracer) {
    assert_eq!(tracer.opened(), tracer.finished(), "{:?}", tracer.spans());
    assert!(tracer.spans().iter().all(|span| span.finish_count == 1));
}

#[test]
fn classify_follows_first_match_rules() {
    assert_eq!(classify("hello", "/start hello"), Intent::Hello);
    assert_eq!(classify("", "/start"), Intent::Start);
    assert_eq!(classify("", "/help"), Intent::Help);
    assert_eq!(classify("", "hello"), Intent::Hello);
    assert_eq!(classify("", "ding"), Intent::Ding);
    assert_eq!(classify("", "/get"), Intent::Get);
    assert_eq!(classify("", "what"), Intent::Unclassified);
    assert_eq!(classify("xyz", "/get foo"), Intent::Get);
    assert_eq!(classify("foo", "/start foo"), Intent::Usage);
    assert_eq!(classify("foo", "/start foo"), classify("foo", "/start foo"));
}

#[test]
fn unnamed_intents_share_undefined_label() {
    assert_eq!(Intent::Usage.label(), UNDEFINED_LABEL);
    assert_eq!(Intent::Unclassified.label(), UNDEFINED_LABEL);
    assert_eq!(Intent::Get.label(), "get");
}

#[tokio::test]
async fn hello_replies_with_greeting_and_counts_once() -> Result<()> {
    let h = harness();
    let replier = RecordingReplier::new();

    let handled = h.router.handle(&command("hello"), &replier).await?;

    assert_eq!(handled.intent, Intent::Hello);
    let sent = replier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "42");
    assert_eq!(sent[0].1.text, "<b>Hello, Alice</b>\nI'm v1.2.3!");
    assert_eq!(sent[0].1.mode, ReplyMode::Html);
    assert_eq!(h.metrics.increments(), vec!["hello".to_string()]);
    assert_eq!(h.tracer.opened(), 2);
    assert_spans_balanced(&h.tracer);
    Ok(())
}

#[tokio::test]
async fn start_with_hello_payload_is_hello() -> Result<()> {
    let h = harness();
    let replier = RecordingReplier::new();

    let handled = h.router.handle(&command("/start hello"), &replier).await?;

    assert_eq!(handled.intent, Intent::Hello);
    assert_eq!(h.metrics.increments(), vec!["hello".to_string()]);
    Ok(())
}

#[tokio::test]
async fn simple_commands_reply_with_fixed_texts() -> Result<()> {
    let h = harness();
    let replier = RecordingReplier::new();

    h.router.handle(&command("ding"), &replier).await?;
    h.router.handle(&command("/help"), &replier).await?;
    h.router.handle(&command("/start"), &replier).await?;

    let texts: Vec<_> = replier.sent().into_iter().map(|(_, r)| r.text).collect();
    assert_eq!(texts[0], "dong");
    assert_eq!(texts[1], "NP Kbot help page... be soon");
    assert!(texts[2].starts_with("<b>Usage:</b>"));
    assert!(texts[2].contains("/get"));
    assert_eq!(
        h.metrics.increments(),
        vec!["ding".to_string(), "help".to_string(), "start".to_string()]
    );
    assert_spans_balanced(&h.tracer);
    Ok(())
}

#[tokio::test]
async fn unclassified_command_sends_nothing_but_is_counted() -> Result<()> {
    let h = harness();
    let replier = RecordingReplier::new();

    let handled = h.router.handle(&command("what is this"), &replier).await?;

    assert_eq!(handled.intent, Intent::Unclassified);
    assert!(handled.reply.is_none());
    assert!(replier.sent().is_empty());
    assert_eq!(h.metrics.increments(), vec![UNDEFINED_LABEL.to_string()]);
    assert_spans_balanced(&h.tracer);
    Ok(())
}

#[tokio::test]
async fn unknown_command_with_payload_gets_short_usage() -> Result<()> {
    let h = harness();
    let replier = RecordingReplier::new();

    let handled = h.router.handle(&command("/start foo"), &replier).await?;

    assert_eq!(handled.intent, Intent::Usage);
    let sent = replier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.text.starts_with("<b>Usage:</b>"));
    assert!(!sent[0].1.text.contains("/get"));
    assert_eq!(h.metrics.increments(), vec![UNDEFINED_LABEL.to_string()]);
    Ok(())
}

#[tokio::test]
async fn get_dispatches_under_command_span_and_reports_trace_id() -> Result<()> {
    let h = harness();
    let replier = RecordingReplier::new();

    let handled = h.router.handle(&command("/get xyz"), &replier).await?;

    assert_eq!(handled.intent, Intent::Get);
    let roots = h.tracer.spans_named(ROOT_SPAN_NAME);
    let commands = h.tracer.spans_named(COMMAND_SPAN_NAME);
    assert_eq!(roots.len(), 1);
    assert_eq!(commands.len(), 1);
    let (root, command_span) = (&roots[0], &commands[0]);

    assert_eq!(root.parent_span_id, None);
    assert_eq!(root.tag("component"), Some("kbot"));
    assert_eq!(root.tag("trace_id"), Some(root.trace_id.as_str()));
    assert_eq!(command_span.parent_span_id.as_deref(), Some(root.span_id.as_str()));
    assert_eq!(command_span.operation_name, "command: get");
    assert_eq!(command_span.tag("span.kind"), Some("client"));
    assert_eq!(command_span.tag("peer.service"), Some("get-kbot-message"));
    assert_eq!(command_span.logs.len(), 2);

    for name in [
        "push_request_start_timer_span",
        "push_request_start_ticker_span",
    ] {
        let spans = h.tracer.spans_named(name);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].trace_id, root.trace_id);
        assert_eq!(
            spans[0].parent_span_id.as_deref(),
            Some(command_span.span_id.as_str())
        );
    }

    let sent = replier.sent();
    assert_eq!(sent.len(), 1);
    let reply = &sent[0].1;
    assert_eq!(reply.mode, ReplyMode::Html);
    assert!(reply.text.starts_with("<b>Trace request()</b> start at "));
    assert!(reply.text.contains("\nDuration: "));
    assert!(reply.text.ends_with(&format!("TraceID: {}", root.trace_id)));

    assert_eq!(h.metrics.increments(), vec!["get".to_string()]);
    assert_spans_balanced(&h.tracer);
    Ok(())
}

#[tokio::test]
async fn failed_reply_still_closes_spans_and_counts_once() -> Result<()> {
    let h = harness();
    let replier = RecordingReplier::failing();

    let result = h.router.handle(&command("ding"), &replier).await;

    assert!(result.is_err());
    assert_eq!(replier.sent().len(), 1);
    assert_eq!(h.metrics.increments(), vec!["ding".to_string()]);
    assert_spans_balanced(&h.tracer);
    Ok(())
}

#[tokio::test]
async fn concurrent_commands_get_distinct_traces() -> Result<()> {
    let h = harness();
    let replier = RecordingReplier::new();

    let ding = command("ding");
    let hello = command("hello");
    let (first, second) = tokio::join!(
        h.router.handle(&ding, &replier),
        h.router.handle(&hello, &replier),
    );
    first?;
    second?;

    let roots = h.tracer.spans_named(ROOT_SPAN_NAME);
    assert_eq!(roots.len(), 2);
    assert_ne!(roots[0].trace_id, roots[1].trace_id);
    assert_eq!(h.metrics.counts().values().sum::<u64>(), 2);
    assert_spans_balanced(&h.tracer);
    Ok(())
}

#[tokio::test]
async fn get_prefix_dispatches_the_command_payload_not_the_text() -> Result<()> {
    let Some((endpoint, app, handle)) = spawn_mock_app().await? else {
        return Ok(());
    };
    let h = harness_with_endpoint(&endpoint);
    let replier = RecordingReplier::new();
    let mut inbound = command("/get foo");
    inbound.payload = "xyz".to_string();

    let handled = h.router.handle(&inbound, &replier).await?;

    assert_eq!(handled.intent, Intent::Get);
    assert_eq!(app.posted.lock().await.clone(), vec!["xyz".to_string()]);
    assert_eq!(*app.pings.lock().await, 1);
    let sent = replier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.text.starts_with("<b>Trace request()</b> start at "));
    assert_eq!(h.metrics.increments(), vec!["get".to_string()]);
    assert_spans_balanced(&h.tracer);
    handle.abort();
    Ok(())
}
