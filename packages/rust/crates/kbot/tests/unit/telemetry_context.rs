use opentelemetry::trace::{SpanId, TraceId};

use super::TraceContext;

fn sample_context(sampled: bool) -> TraceContext {
    TraceContext {
        trace_id: TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736").unwrap_or(TraceId::INVALID),
        span_id: SpanId::from_hex("00f067aa0ba902b7").unwrap_or(SpanId::INVALID),
        sampled,
    }
}

#[test]
fn trace_id_hex_is_32_lowercase_chars() {
    let context = sample_context(true);
    assert_eq!(context.trace_id_hex(), "4bf92f3577b34da6a3ce929d0e0e4736");
    assert!(context.is_valid());
}

#[test]
fn http_headers_carry_w3c_traceparent() {
    let headers = sample_context(true).http_headers();
    assert_eq!(
        headers.get("traceparent").map(String::as_str),
        Some("00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01")
    );
}

#[test]
fn unsampled_context_propagates_cleared_flag() {
    let headers = sample_context(false).http_headers();
    assert_eq!(
        headers.get("traceparent").map(String::as_str),
        Some("00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-00")
    );
}

#[test]
fn invalid_context_injects_nothing() {
    let context = TraceContext {
        trace_id: TraceId::INVALID,
        span_id: SpanId::INVALID,
        sampled: false,
    };
    assert!(!context.is_valid());
    assert!(!context.http_headers().contains_key("traceparent"));
}
