//! Mock implementations for testing
//!
//! These mocks enable integration testing without real I/O.

use crate::llm::{CompletionClient, LlmError, LlmRequest};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, Semaphore};

// ============================================================================
// Mock Completion Client
// ============================================================================

/// Mock completion client that returns queued responses
pub struct MockCompletionClient {
    responses: Mutex<VecDeque<Result<String, LlmError>>>,
    /// Record of all calls made: (api key, request)
    calls: Mutex<Vec<(String, LlmRequest)>>,
}

impl MockCompletionClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_text(&self, text: impl Into<String>) {
        self.responses.lock().unwrap().push_back(Ok(text.into()));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_calls(&self) -> Vec<(String, LlmRequest)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn next_response(&self) -> Result<String, LlmError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::transport("No mock response queued")))
    }
}

impl Default for MockCompletionClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, api_key: &str, request: &LlmRequest) -> Result<String, LlmError> {
        self.calls
            .lock()
            .unwrap()
            .push((api_key.to_string(), request.clone()));
        self.next_response()
    }

    fn endpoint(&self) -> &str {
        "mock://completions"
    }
}

// ============================================================================
// Gated Mock Client (for in-flight and cancellation testing)
// ============================================================================

/// Mock client whose calls block until the test releases them
pub struct GatedMockClient {
    inner: MockCompletionClient,
    gate: Semaphore,
    /// Notified when a call starts waiting on the gate
    pub call_started: Arc<Notify>,
    started: AtomicUsize,
    finished: AtomicUsize,
}

impl GatedMockClient {
    pub fn new() -> Self {
        Self {
            inner: MockCompletionClient::new(),
            gate: Semaphore::new(0),
            call_started: Arc::new(Notify::new()),
            started: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
        }
    }

    pub fn queue_text(&self, text: impl Into<String>) {
        self.inner.queue_text(text);
    }

    /// Let `n` blocked calls proceed
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    pub fn started_calls(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    /// Calls that got past the gate and returned
    pub fn finished_calls(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn recorded_calls(&self) -> Vec<(String, LlmRequest)> {
        self.inner.recorded_calls()
    }
}

#[async_trait]
impl CompletionClient for GatedMockClient {
    async fn complete(&self, api_key: &str, request: &LlmRequest) -> Result<String, LlmError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        self.call_started.notify_one();
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| LlmError::transport("gate closed"))?;
        permit.forget();
        let result = self.inner.complete(api_key, request).await;
        self.finished.fetch_add(1, Ordering::SeqCst);
        result
    }

    fn endpoint(&self) -> &str {
        "mock://gated"
    }
}
