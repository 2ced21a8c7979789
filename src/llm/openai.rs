//! `OpenAI`-compatible chat-completion client
//!
//! Targets local servers such as LM Studio that expose
//! `/v1/chat/completions`.

use super::types::{ChatMessage, LlmRequest};
use super::{CompletionClient, LlmError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// LM Studio's default chat-completion endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:1234/v1/chat/completions";

/// Chat-completion client for a single endpoint
pub struct OpenAICompatClient {
    client: Client,
    endpoint: String,
}

impl OpenAICompatClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    fn translate_request(request: &LlmRequest) -> ChatCompletionRequest<'_> {
        ChatCompletionRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
        }
    }

    fn normalize_response(body: &str) -> Result<String, LlmError> {
        let resp: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
            LlmError::protocol(format!("Failed to parse response: {e} - body: {body}"))
        })?;

        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::protocol("No choices in response"))?;

        choice
            .message
            .content
            .ok_or_else(|| LlmError::protocol("First choice has no message content"))
    }
}

#[async_trait]
impl CompletionClient for OpenAICompatClient {
    async fn complete(&self, api_key: &str, request: &LlmRequest) -> Result<String, LlmError> {
        let body = Self::translate_request(request);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::transport(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    LlmError::transport(format!("Connection failed: {e}"))
                } else {
                    LlmError::transport(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::transport(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(LlmError::http(status.as_u16(), text));
        }

        Self::normalize_response(&text)
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

// Wire types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    #[allow(dead_code)] // Part of API response, not consumed
    role: Option<String>,
    content: Option<String>,
}
