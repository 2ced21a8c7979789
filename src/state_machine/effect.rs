//! Effects produced by state transitions

use crate::evaluation::EvaluationRequest;
use crate::state_machine::state::{DisplayedError, Round};

/// Effects to be executed after state transition
#[derive(Debug, Clone)]
pub enum Effect {
    /// Start the two-step evaluation pipeline
    RequestEvaluation {
        ticket: u64,
        request: EvaluationRequest,
    },

    /// Abort the pipeline started for `ticket`
    AbortEvaluation { ticket: u64 },

    /// Tell connected clients a round was recorded
    NotifyRound { round: Round },

    /// Tell connected clients about a learner-visible error
    NotifyError { error: DisplayedError },
}

impl Effect {
    pub fn notify_round(round: Round) -> Self {
        Effect::NotifyRound { round }
    }

    pub fn notify_error(error: DisplayedError) -> Self {
        Effect::NotifyError { error }
    }
}
