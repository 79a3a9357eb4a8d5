//! Chat-completion client abstraction.
//!
//! The diagnosis handler only needs "send a conversation, get text back",
//! so the upstream API sits behind [`CompletionClient`] and tests can swap
//! in [`mock::MockCompletionClient`].

pub mod mock;
pub mod openrouter;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use openrouter::OpenRouterClient;

/// Error type for completion calls.
#[derive(Error, Debug)]
pub enum CompletionError {
    /// The API answered with a non-success status.
    #[error("completion API returned status {status}")]
    Upstream { status: u16, body: String },

    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("{0}")]
    Transport(String),

    /// A success response whose body could not be read as JSON.
    #[error("invalid completion response: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send the conversation and return the first choice's text, if any.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Option<String>, CompletionError>;
}

/// Pull `choices[0].message.content` out of a chat-completion response.
///
/// Text is returned as-is. Structured content (e.g. an array of content
/// parts) is relayed as its JSON text. Empty values (`null`, `""`, `false`,
/// `0`) count as no content.
pub fn extract_content(payload: &Value) -> Option<String> {
    match payload.pointer("/choices/0/message/content")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_first_choice_content() {
        let payload = json!({
            "choices": [
                { "message": { "role": "assistant", "content": "first" } },
                { "message": { "role": "assistant", "content": "second" } }
            ]
        });
        assert_eq!(extract_content(&payload).as_deref(), Some("first"));
    }

    #[test]
    fn missing_shapes_yield_none() {
        assert_eq!(extract_content(&json!({})), None);
        assert_eq!(extract_content(&json!({ "choices": [] })), None);
        assert_eq!(extract_content(&json!({ "choices": [{}] })), None);
        assert_eq!(
            extract_content(&json!({ "choices": [{ "message": { "content": null } }] })),
            None
        );
        assert_eq!(extract_content(&json!([1, 2])), None);
    }

    fn with_content(content: Value) -> Value {
        json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] })
    }

    #[test]
    fn structured_content_is_relayed_as_json_text() {
        let parts = json!([{ "type": "text", "text": "hello" }]);
        let relayed = extract_content(&with_content(parts.clone())).expect("content relayed");
        assert_eq!(serde_json::from_str::<Value>(&relayed).unwrap(), parts);
        assert_eq!(extract_content(&with_content(json!(42))).as_deref(), Some("42"));
        assert_eq!(extract_content(&with_content(json!(true))).as_deref(), Some("true"));
    }

    #[test]
    fn empty_values_count_as_no_content() {
        assert_eq!(extract_content(&with_content(json!(""))), None);
        assert_eq!(extract_content(&with_content(json!(false))), None);
        assert_eq!(extract_content(&with_content(json!(0))), None);
    }

    #[test]
    fn roles_serialize_lowercase() {
        let value = serde_json::to_value(ChatMessage::system("x")).unwrap();
        assert_eq!(value, json!({ "role": "system", "content": "x" }));
    }
}
