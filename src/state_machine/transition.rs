//! Pure state transition function
//!
//! Every learner intent and every pipeline outcome goes through
//! [`transition`], which returns the next session plus the effects the
//! runtime must carry out. No I/O happens here.

use super::state::{DisplayedError, Round, Session, SessionPhase};
use super::{Effect, Event};
use crate::evaluation::EvaluationRequest;
use crate::llm::LlmError;
use thiserror::Error;

/// Message for a submit without a usable API key
pub const MISSING_API_KEY: &str = "API key not set";

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: Session,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: Session) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("An answer is being evaluated, wait for the result or pick a new topic")]
    Busy,
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
pub fn transition(state: &Session, event: Event) -> Result<TransitionResult, TransitionError> {
    match (state.phase, event) {
        // ============================================================
        // Topic changes: valid from every phase
        // ============================================================
        (phase, Event::NewTopic { topic }) => {
            let next = Session {
                topic,
                mode: state.mode,
                answer: String::new(),
                phase: SessionPhase::Input,
                result: None,
                error: None,
                history: state.history.clone(),
                last_ticket: state.last_ticket,
            };
            let result = TransitionResult::new(next);
            Ok(match phase {
                SessionPhase::Evaluating { ticket } => {
                    result.with_effect(Effect::AbortEvaluation { ticket })
                }
                SessionPhase::Input | SessionPhase::Feedback => result,
            })
        }

        // ============================================================
        // Answer editing
        // ============================================================
        (SessionPhase::Input, Event::EditAnswer { text }) => {
            let mut next = state.clone();
            next.answer = text;
            Ok(TransitionResult::new(next))
        }

        (SessionPhase::Evaluating { .. }, Event::EditAnswer { .. } | Event::SelectMode { .. }) => {
            Err(TransitionError::Busy)
        }

        (SessionPhase::Feedback, Event::EditAnswer { .. }) => Err(
            TransitionError::InvalidTransition(
                "answer is locked after feedback, pick a new topic".to_string(),
            ),
        ),

        // ============================================================
        // Mode selection
        // ============================================================
        (SessionPhase::Input | SessionPhase::Feedback, Event::SelectMode { mode }) => {
            let mut next = state.clone();
            next.mode = mode;
            Ok(TransitionResult::new(next))
        }

        // ============================================================
        // Submission
        // ============================================================

        // Blank answer: nothing to evaluate
        (SessionPhase::Input, Event::Submit { .. }) if state.answer.trim().is_empty() => {
            Ok(TransitionResult::new(state.clone()))
        }

        // No API key: surface a configuration error without touching the network
        (SessionPhase::Input, Event::Submit { settings }) if !settings.has_api_key() => {
            let error = DisplayedError::from(&LlmError::configuration(MISSING_API_KEY));
            let mut next = state.clone();
            next.error = Some(error.clone());
            Ok(TransitionResult::new(next).with_effect(Effect::notify_error(error)))
        }

        (SessionPhase::Input, Event::Submit { settings }) => {
            let ticket = state.last_ticket + 1;
            let request = EvaluationRequest {
                api_key: settings.api_key,
                model: settings.model,
                topic: state.topic.clone(),
                mode: state.mode,
                answer: state.answer.clone(),
            };
            let mut next = state.clone();
            next.last_ticket = ticket;
            next.phase = SessionPhase::Evaluating { ticket };
            next.result = None;
            next.error = None;
            Ok(TransitionResult::new(next).with_effect(Effect::RequestEvaluation { ticket, request }))
        }

        (SessionPhase::Evaluating { .. }, Event::Submit { .. }) => Err(TransitionError::Busy),

        (SessionPhase::Feedback, Event::Submit { .. }) => Err(TransitionError::InvalidTransition(
            "already evaluated, pick a new topic".to_string(),
        )),

        // ============================================================
        // Pipeline outcomes for the current submission
        // ============================================================
        (
            SessionPhase::Evaluating { ticket },
            Event::EvaluationComplete {
                ticket: done,
                evaluation,
                completed_at,
            },
        ) if ticket == done => {
            let round = Round::from_evaluation(&evaluation, completed_at);
            let mut next = state.clone();
            next.history.push(round.clone());
            next.result = Some(evaluation);
            next.error = None;
            next.phase = SessionPhase::Feedback;
            Ok(TransitionResult::new(next).with_effect(Effect::notify_round(round)))
        }

        (SessionPhase::Evaluating { ticket }, Event::EvaluationFailed { ticket: done, error })
            if ticket == done =>
        {
            let error = DisplayedError::from(&error);
            let mut next = state.clone();
            next.result = None;
            next.error = Some(error.clone());
            next.phase = SessionPhase::Input;
            Ok(TransitionResult::new(next).with_effect(Effect::notify_error(error)))
        }

        // Outcome of a submission that was superseded: drop it
        (_, Event::EvaluationComplete { .. } | Event::EvaluationFailed { .. }) => {
            Ok(TransitionResult::new(state.clone()))
        }
    }
}
