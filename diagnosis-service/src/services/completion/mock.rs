//! Mock completion client for testing.

use super::{ChatMessage, CompletionClient, CompletionError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::Semaphore;

/// Canned outcome returned by [`MockCompletionClient`].
#[derive(Debug, Clone)]
pub enum MockReply {
    Content(Option<String>),
    Upstream { status: u16, body: String },
    Transport(String),
}

/// Records every conversation it receives and answers with a fixed reply.
pub struct MockCompletionClient {
    reply: MockReply,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
    hold: Option<Arc<Semaphore>>,
}

impl MockCompletionClient {
    pub fn new(reply: MockReply) -> Self {
        Self {
            reply,
            calls: Mutex::new(Vec::new()),
            hold: None,
        }
    }

    pub fn replying(text: &str) -> Self {
        Self::new(MockReply::Content(Some(text.to_string())))
    }

    /// Block each call until a permit is added to `gate`.
    pub fn held_by(mut self, gate: Arc<Semaphore>) -> Self {
        self.hold = Some(gate);
        self
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Option<String>, CompletionError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(messages.to_vec());
        }

        if let Some(gate) = &self.hold {
            // A closed gate releases everyone.
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        match &self.reply {
            MockReply::Content(text) => Ok(text.clone()),
            MockReply::Upstream { status, body } => Err(CompletionError::Upstream {
                status: *status,
                body: body.clone(),
            }),
            MockReply::Transport(msg) => Err(CompletionError::Transport(msg.clone())),
        }
    }
}
