/// Classified meaning of an inbound command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Hello,
    Start,
    Help,
    Ding,
    Get,
    /// Non-empty payload that is not a `/get`: answered with usage text.
    Usage,
    /// Empty payload and unknown text: no reply.
    Unclassified,
}

/// Metric label for commands that resolve to no named intent.
pub const UNDEFINED_LABEL: &str = "undefined";

impl Intent {
    /// Metric label, also used for span naming and tags.
    pub fn label(self) -> &'static str {
        match self {
            Self::Hello => "hello",
            Self::Start => "start",
            Self::Help => "help",
            Self::Ding => "ding",
            Self::Get => "get",
            Self::Usage | Self::Unclassified => UNDEFINED_LABEL,
        }
    }
}

/// Classify a command. First match wins:
/// 1. payload `hello`;
/// 2. empty payload: exact text match, else [`Intent::Unclassified`];
/// 3. other payloads: `/get` prefix, else [`Intent::Usage`].
pub fn classify(payload: &str, text: &str) -> Intent {
    match payload {
        "hello" => Intent::Hello,
        "" => match text {
            "/start" => Intent::Start,
            "/help" => Intent::Help,
            "/hello" | "hello" => Intent::Hello,
            "ding" => Intent::Ding,
            "/get" => Intent::Get,
            _ => Intent::Unclassified,
        },
        _ if text.starts_with("/get") => Intent::Get,
        _ => Intent::Usage,
    }
}
