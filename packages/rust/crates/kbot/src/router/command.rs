use async_trait::async_trait;

/// Identity of the chat user who sent a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sender {
    pub id: String,
    pub username: Option<String>,
    pub first_name: String,
}

/// One incoming text message, consumed once by the router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundCommand {
    /// Unique message id (e.g. `telegram_{chat_id}_{message_id}`).
    pub id: String,
    /// Reply target (for Telegram, the chat id).
    pub recipient: String,
    pub sender: Sender,
    pub text: String,
    /// Text after a leading `/command`, trimmed; empty otherwise.
    pub payload: String,
}

impl InboundCommand {
    /// Build a command from raw message text, deriving the payload.
    pub fn from_text(
        id: impl Into<String>,
        recipient: impl Into<String>,
        sender: Sender,
        text: impl Into<String>,
    ) -> Self {
        let text = text.into();
        let payload = extract_payload(&text).to_string();
        Self {
            id: id.into(),
            recipient: recipient.into(),
            sender,
            text,
            payload,
        }
    }
}

/// `"/get some text"` → `"some text"`; text without a leading command has no payload.
pub fn extract_payload(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with('/') {
        return "";
    }
    match trimmed.split_once(char::is_whitespace) {
        Some((_, rest)) => rest.trim(),
        None => "",
    }
}

/// Rendering mode the transport should use for a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyMode {
    Plain,
    Html,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub mode: ReplyMode,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mode: ReplyMode::Plain,
        }
    }

    pub fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            mode: ReplyMode::Html,
        }
    }
}

/// Transport seam used by the router to answer the sender.
#[async_trait]
pub trait Replier: Send + Sync {
    async fn reply(&self, recipient: &str, reply: &Reply) -> anyhow::Result<()>;
}
