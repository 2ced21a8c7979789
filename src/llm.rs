//! Chat-completion client abstraction
//!
//! A single request/response call against an `OpenAI`-compatible endpoint.

mod error;
mod openai;
mod types;

pub use error::{ErrorKind, LlmError};
#[cfg(test)]
pub use error::GENERIC_API_ERROR;
pub use openai::{OpenAICompatClient, DEFAULT_ENDPOINT};
pub use types::*;

use async_trait::async_trait;

/// Common interface for completion backends
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send one request and return the first choice's text.
    ///
    /// Never retries; the first failure is returned as-is.
    async fn complete(&self, api_key: &str, request: &LlmRequest) -> Result<String, LlmError>;

    /// Endpoint this client talks to (for logging)
    fn endpoint(&self) -> &str;
}

/// Logging wrapper for completion clients
pub struct LoggingClient<C> {
    inner: C,
}

impl<C: CompletionClient> LoggingClient<C> {
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<C: CompletionClient> CompletionClient for LoggingClient<C> {
    async fn complete(&self, api_key: &str, request: &LlmRequest) -> Result<String, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(api_key, request).await;
        let duration = start.elapsed();

        match &result {
            Ok(text) => {
                tracing::info!(
                    model = %request.model,
                    endpoint = %self.inner.endpoint(),
                    duration_ms = %duration.as_millis(),
                    response_chars = text.chars().count(),
                    "Completion request finished"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %request.model,
                    endpoint = %self.inner.endpoint(),
                    duration_ms = %duration.as_millis(),
                    kind = ?e.kind,
                    status = ?e.status,
                    error = %e.message,
                    "Completion request failed"
                );
            }
        }

        result
    }

    fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::testing::MockCompletionClient;

    fn request() -> LlmRequest {
        LlmRequest::new("local-llama", vec![ChatMessage::user("hello")]).with_temperature(0.7)
    }

    #[tokio::test]
    async fn test_logging_client_passes_through_success() {
        let inner = MockCompletionClient::new();
        inner.queue_text("hi there");
        let client = LoggingClient::new(inner);

        let result = client.complete("sk-local", &request()).await;

        assert_eq!(result, Ok("hi there".to_string()));
        assert_eq!(client.endpoint(), "mock://completions");
        let calls = client.inner.recorded_calls();
        assert_eq!(calls, vec![("sk-local".to_string(), request())]);
    }

    #[tokio::test]
    async fn test_logging_client_passes_through_error() {
        let inner = MockCompletionClient::new();
        inner.queue_error(LlmError::http(503, "model loading"));
        let client = LoggingClient::new(inner);

        let result = client.complete("sk-local", &request()).await;

        assert_eq!(result, Err(LlmError::http(503, "model loading")));
        assert_eq!(client.inner.call_count(), 1);
    }
}
