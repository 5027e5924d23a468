use std::time::Duration;

use chrono::{DateTime, Local};

use super::Reply;

const START_USAGE: &str = "<b>Usage:</b>\n /help - for help message\n hello - to view 'hello message'\n /get &lt;text&gt; - send a request to an external server\n ding - get 'dong' response";
const SHORT_USAGE: &str = "<b>Usage:</b>\n /help - for help message\n hello - to view 'hello message'\n ding - get 'dong' response";
const HELP_TEXT: &str = "NP Kbot help page... be soon";
const DING_TEXT: &str = "dong";

pub(super) fn start_usage() -> Reply {
    Reply::html(START_USAGE)
}

pub(super) fn short_usage() -> Reply {
    Reply::html(SHORT_USAGE)
}

pub(super) fn help() -> Reply {
    Reply::plain(HELP_TEXT)
}

pub(super) fn ding() -> Reply {
    Reply::plain(DING_TEXT)
}

pub(super) fn hello(first_name: &str, version: &str) -> Reply {
    Reply::html(format!(
        "<b>Hello, {}</b>\nI'm {}!",
        escape_html(first_name),
        escape_html(version)
    ))
}

pub(super) fn dispatch_timing(
    started: DateTime<Local>,
    finished: DateTime<Local>,
    elapsed: Duration,
    trace_id: &str,
) -> Reply {
    Reply::html(format!(
        "<b>Trace request()</b> start at {}, end at {}\nDuration: {elapsed:?}, TraceID: {trace_id}",
        started.format("%H:%M:%S%.3f"),
        finished.format("%H:%M:%S%.3f"),
    ))
}

pub(super) fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}
