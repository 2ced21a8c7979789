//! Free chat against the configured endpoint
//!
//! The transcript grows by one user turn per message and one assistant turn
//! per successful reply. Every request carries the whole transcript.

use crate::llm::{ChatMessage, CompletionClient, LlmError, LlmRequest};
use crate::settings::SettingsService;
use crate::state_machine::transition::MISSING_API_KEY;
use crate::state_machine::DisplayedError;
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("Message is empty")]
    EmptyMessage,
    #[error("A reply is still pending")]
    Busy,
}

/// Conversation as shown to the learner
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChatTranscript {
    pub messages: Vec<ChatMessage>,
    pub pending: bool,
    pub error: Option<DisplayedError>,
}

pub struct ChatService {
    client: Arc<dyn CompletionClient>,
    settings: Arc<SettingsService>,
    transcript: Mutex<ChatTranscript>,
}

impl ChatService {
    pub fn new(client: Arc<dyn CompletionClient>, settings: Arc<SettingsService>) -> Self {
        Self {
            client,
            settings,
            transcript: Mutex::new(ChatTranscript::default()),
        }
    }

    pub fn transcript(&self) -> ChatTranscript {
        self.lock().clone()
    }

    /// Append `text` as a user turn and wait for the assistant's reply
    pub async fn send(&self, text: &str) -> Result<ChatTranscript, ChatError> {
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let settings = self.settings.get();
        let request = {
            let mut transcript = self.lock();
            if transcript.pending {
                return Err(ChatError::Busy);
            }
            if !settings.has_api_key() {
                transcript.error = Some(DisplayedError::from(&LlmError::configuration(
                    MISSING_API_KEY,
                )));
                return Ok(transcript.clone());
            }

            transcript.messages.push(ChatMessage::user(text));
            transcript.pending = true;
            transcript.error = None;
            LlmRequest::new(settings.model.clone(), transcript.messages.clone())
        };

        let mut turn = PendingTurn {
            transcript: &self.transcript,
            finished: false,
        };

        tracing::debug!(turns = request.messages.len(), "Sending chat turn");
        let outcome = self.client.complete(&settings.api_key, &request).await;

        let mut transcript = self.lock();
        transcript.pending = false;
        turn.finished = true;
        match outcome {
            Ok(reply) => transcript.messages.push(ChatMessage::assistant(reply)),
            Err(e) => {
                tracing::warn!(kind = ?e.kind, error = %e, "Chat turn failed");
                transcript.error = Some(DisplayedError::from(&e));
            }
        }
        Ok(transcript.clone())
    }

    fn lock(&self) -> MutexGuard<'_, ChatTranscript> {
        self.transcript
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Clears `pending` if the caller drops `send` before the reply arrives
struct PendingTurn<'a> {
    transcript: &'a Mutex<ChatTranscript>,
    finished: bool,
}

impl Drop for PendingTurn<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        tracing::info!("Chat turn abandoned before a reply arrived");
        self.transcript
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pending = false;
    }
}
