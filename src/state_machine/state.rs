//! Practice session state types

use crate::evaluation::Evaluation;
use crate::llm::{ErrorKind, LlmError};
use crate::practice::{Mode, Topic};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Where the learner is in the current exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionPhase {
    /// Answer may be edited and submitted
    #[default]
    Input,
    /// A submission is in flight; `ticket` identifies it
    Evaluating { ticket: u64 },
    /// Result available until the next topic
    Feedback,
}

impl SessionPhase {
    pub fn name(self) -> &'static str {
        match self {
            SessionPhase::Input => "input",
            SessionPhase::Evaluating { .. } => "evaluating",
            SessionPhase::Feedback => "feedback",
        }
    }
}

/// One completed practice exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Round {
    pub id: Uuid,
    pub topic: Topic,
    pub mode: Mode,
    pub user_answer: String,
    pub model_example: String,
    pub feedback: String,
    pub completed_at: DateTime<Utc>,
}

impl Round {
    /// The only way to build a round: from a finished two-step evaluation
    pub fn from_evaluation(evaluation: &Evaluation, completed_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            topic: evaluation.topic().clone(),
            mode: evaluation.mode(),
            user_answer: evaluation.user_answer().to_string(),
            model_example: evaluation.example().to_string(),
            feedback: evaluation.feedback().to_string(),
            completed_at,
        }
    }
}

/// Error shown to the learner
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayedError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&LlmError> for DisplayedError {
    fn from(error: &LlmError) -> Self {
        Self {
            kind: error.kind,
            message: error.display_message(),
        }
    }
}

/// The whole learner-facing session
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    pub topic: Topic,
    pub mode: Mode,
    pub answer: String,
    pub phase: SessionPhase,
    /// Example and feedback currently on display
    pub result: Option<Evaluation>,
    pub error: Option<DisplayedError>,
    /// Completed rounds, oldest first
    pub history: Vec<Round>,
    #[serde(skip)]
    pub(super) last_ticket: u64,
}

impl Session {
    /// Fresh session showing `topic`
    pub fn new(topic: Topic) -> Self {
        Self {
            topic,
            mode: Mode::default(),
            answer: String::new(),
            phase: SessionPhase::Input,
            result: None,
            error: None,
            history: Vec::new(),
            last_ticket: 0,
        }
    }

    /// Ticket of the in-flight submission, if any
    pub fn in_flight_ticket(&self) -> Option<u64> {
        match self.phase {
            SessionPhase::Evaluating { ticket } => Some(ticket),
            _ => None,
        }
    }

    pub fn is_evaluating(&self) -> bool {
        self.in_flight_ticket().is_some()
    }
}
