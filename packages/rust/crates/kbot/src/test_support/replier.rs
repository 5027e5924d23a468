use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::router::{Replier, Reply};

/// Replier that records replies and can be told to fail every send.
#[derive(Clone, Default)]
pub struct RecordingReplier {
    sent: Arc<Mutex<Vec<(String, Reply)>>>,
    fail: bool,
}

impl RecordingReplier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent: Arc::default(),
            fail: true,
        }
    }

    /// `(recipient, reply)` pairs for every attempted send.
    pub fn sent(&self) -> Vec<(String, Reply)> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Replier for RecordingReplier {
    async fn reply(&self, recipient: &str, reply: &Reply) -> anyhow::Result<()> {
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((recipient.to_string(), reply.clone()));
        if self.fail {
            anyhow::bail!("reply transport unavailable");
        }
        Ok(())
    }
}
