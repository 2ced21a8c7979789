//! LLM error types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shown when a failure carries no detail text of its own
pub const GENERIC_API_ERROR: &str = "API error, verify the endpoint is reachable";

/// LLM error with classification
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct LlmError {
    pub kind: ErrorKind,
    pub message: String,
    /// HTTP status for `ErrorKind::Http`
    pub status: Option<u16>,
}

impl LlmError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    /// Non-2xx response; `body` is the raw response text
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Http,
            message: body.into(),
            status: Some(status),
        }
    }

    pub fn protocol(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Protocol, message)
    }

    /// Text suitable for showing to the learner
    pub fn display_message(&self) -> String {
        let detail = self.message.trim();
        if detail.is_empty() {
            GENERIC_API_ERROR.to_string()
        } else {
            detail.to_string()
        }
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Missing settings, caught before any network call
    Configuration,
    /// DNS, connection refused, timeout, body read failure
    Transport,
    /// Non-2xx response
    Http,
    /// 2xx response with an unusable body
    Protocol,
}
