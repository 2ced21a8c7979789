//! Events that can occur in a practice session

use crate::evaluation::Evaluation;
use crate::llm::LlmError;
use crate::practice::{Mode, Topic};
use crate::settings::Settings;
use chrono::{DateTime, Utc};

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // Learner events
    NewTopic {
        topic: Topic,
    },
    EditAnswer {
        text: String,
    },
    SelectMode {
        mode: Mode,
    },
    /// `settings` is the snapshot taken when the learner pressed submit
    Submit {
        settings: Settings,
    },

    // Evaluation pipeline events
    EvaluationComplete {
        ticket: u64,
        evaluation: Evaluation,
        completed_at: DateTime<Utc>,
    },
    EvaluationFailed {
        ticket: u64,
        error: LlmError,
    },
}
