//! OpenRouter chat-completions client.
//!
//! OpenRouter speaks the OpenAI chat-completions protocol and additionally
//! identifies the calling site through `HTTP-Referer` and `X-Title`.

use super::{extract_content, ChatMessage, CompletionClient, CompletionError};
use crate::config::CompletionSettings;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: &'a [ChatMessage],
}

pub struct OpenRouterClient {
    settings: CompletionSettings,
    client: Client,
}

impl OpenRouterClient {
    /// Build the client. A timeout is only applied when one is configured.
    pub fn new(settings: CompletionSettings) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            settings,
        })
    }
}

#[async_trait]
impl CompletionClient for OpenRouterClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<Option<String>, CompletionError> {
        let request = ChatCompletionRequest {
            model: &self.settings.model,
            temperature: self.settings.temperature,
            messages,
        };

        tracing::debug!(
            model = %self.settings.model,
            endpoint = %self.settings.endpoint,
            message_count = messages.len(),
            "Sending chat completion request"
        );

        let response = self
            .client
            .post(&self.settings.endpoint)
            .bearer_auth(self.settings.api_key.expose_secret())
            .header("HTTP-Referer", &self.settings.site_url)
            .header("X-Title", &self.settings.site_title)
            .json(&request)
            .send()
            .await
            .map_err(|e| CompletionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| CompletionError::Transport(e.to_string()))?;
            return Err(CompletionError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response
            .json()
            .await
            .map_err(|e| CompletionError::Decode(e.to_string()))?;

        Ok(extract_content(&payload))
    }
}
