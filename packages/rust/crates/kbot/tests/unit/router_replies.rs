use std::time::Duration;

use chrono::{Local, TimeZone as _};

use super::replies::{dispatch_timing, escape_html, hello};
use super::{ReplyMode, extract_payload};

#[test]
fn hello_reply_escapes_first_name() {
    let reply = hello("<Ann & Bob>", "v1.2.3");
    assert_eq!(reply.mode, ReplyMode::Html);
    assert_eq!(
        reply.text,
        "<b>Hello, &lt;Ann &amp; Bob&gt;</b>\nI'm v1.2.3!"
    );
}

#[test]
fn dispatch_timing_reply_renders_millisecond_clock_times() {
    let Some(started) = Local.with_ymd_and_hms(2024, 5, 1, 13, 4, 5).single() else {
        return;
    };
    let finished = started + chrono::Duration::milliseconds(1_250);
    let reply = dispatch_timing(started, finished, Duration::from_millis(1_250), "abc123");

    assert_eq!(reply.mode, ReplyMode::Html);
    assert_eq!(
        reply.text,
        "<b>Trace request()</b> start at 13:04:05.000, end at 13:04:06.250\nDuration: 1.25s, TraceID: abc123"
    );
}

#[test]
fn escape_html_leaves_plain_text_untouched() {
    assert_eq!(escape_html("Alice"), "Alice");
    assert_eq!(escape_html("\"q\""), "&quot;q&quot;");
}

#[test]
fn extract_payload_takes_text_after_command() {
    assert_eq!(extract_payload("/get some text"), "some text");
    assert_eq!(extract_payload("/get@kbot   padded  "), "padded");
    assert_eq!(extract_payload("/get"), "");
    assert_eq!(extract_payload("hello"), "");
    assert_eq!(extract_payload("ding dong"), "");
}
