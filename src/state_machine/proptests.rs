//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use crate::evaluation::Evaluation;
use crate::llm::{ErrorKind, LlmError};
use crate::practice::{Mode, Topic, TOPICS};
use crate::settings::Settings;
use chrono::Utc;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_topic() -> impl Strategy<Value = Topic> {
    proptest::sample::select(TOPICS).prop_map(|t| Topic::from_catalog(t).unwrap())
}

fn arb_mode() -> impl Strategy<Value = Mode> {
    prop_oneof![
        Just(Mode::Paraphrase),
        Just(Mode::Circumlocution),
        Just(Mode::Eli5),
    ]
}

fn arb_settings() -> impl Strategy<Value = Settings> {
    prop_oneof![
        Just(Settings::new("sk-local", "local-llama")),
        Just(Settings::new("", "local-llama")),
        Just(Settings::new("   ", "phi-3")),
    ]
}

fn arb_llm_error() -> impl Strategy<Value = LlmError> {
    prop_oneof![
        "[a-zA-Z ]{0,20}".prop_map(LlmError::transport),
        (400u16..600, "[a-zA-Z ]{0,20}").prop_map(|(status, body)| LlmError::http(status, body)),
        "[a-zA-Z ]{0,20}".prop_map(LlmError::protocol),
    ]
}

fn arb_evaluation() -> impl Strategy<Value = Evaluation> {
    (arb_topic(), arb_mode(), "[a-z ]{1,20}", "[a-z ]{1,20}", "[a-z ]{1,20}").prop_map(
        |(topic, mode, answer, example, feedback)| {
            Evaluation::for_test(topic.as_str(), mode, &answer, &example, &feedback)
        },
    )
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_topic().prop_map(|topic| Event::NewTopic { topic }),
        "[a-z ]{0,12}".prop_map(|text| Event::EditAnswer { text }),
        arb_mode().prop_map(|mode| Event::SelectMode { mode }),
        arb_settings().prop_map(|settings| Event::Submit { settings }),
        (1u64..6, arb_evaluation()).prop_map(|(ticket, evaluation)| Event::EvaluationComplete {
            ticket,
            evaluation,
            completed_at: Utc::now(),
        }),
        (1u64..6, arb_llm_error())
            .prop_map(|(ticket, error)| Event::EvaluationFailed { ticket, error }),
    ]
}

fn start() -> Session {
    Session::new(Topic::from_catalog("gravity").unwrap())
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: NewTopic always lands in a clean Input phase with a catalog topic
    #[test]
    fn prop_new_topic_always_resets(
        events in proptest::collection::vec(arb_event(), 0..20),
        topic in arb_topic()
    ) {
        let mut state = start();
        for event in events {
            if let Ok(result) = transition(&state, event) {
                state = result.new_state;
            }
        }

        let history_before = state.history.len();
        let result = transition(&state, Event::NewTopic { topic: topic.clone() });
        prop_assert!(result.is_ok(), "NewTopic rejected: {:?}", result);
        let next = result.unwrap().new_state;

        prop_assert!(TOPICS.contains(&next.topic.as_str()));
        prop_assert_eq!(next.topic, topic);
        prop_assert_eq!(next.phase, SessionPhase::Input);
        prop_assert!(next.answer.is_empty());
        prop_assert!(next.result.is_none());
        prop_assert!(next.error.is_none());
        prop_assert_eq!(next.history.len(), history_before);
    }

    // Invariant 2: history grows by at most one, and only on a matching completion
    #[test]
    fn prop_history_grows_only_on_matching_completion(
        events in proptest::collection::vec(arb_event(), 0..30)
    ) {
        let mut state = start();
        for event in events {
            let expected_growth = matches!(
                (&state.phase, &event),
                (SessionPhase::Evaluating { ticket }, Event::EvaluationComplete { ticket: done, .. })
                    if ticket == done
            );
            let before = state.history.clone();

            if let Ok(result) = transition(&state, event) {
                state = result.new_state;
            }

            if expected_growth {
                prop_assert_eq!(state.history.len(), before.len() + 1);
                prop_assert_eq!(state.phase, SessionPhase::Feedback);
            } else {
                prop_assert_eq!(state.history.len(), before.len());
            }
            // Earlier rounds are never touched
            prop_assert_eq!(&state.history[..before.len()], &before[..]);
        }
    }

    // Invariant 3: only a non-blank answer with a usable key starts the network
    #[test]
    fn prop_request_requires_answer_and_key(
        answer in "[a-z ]{0,8}",
        settings in arb_settings()
    ) {
        let mut state = start();
        state.answer = answer.clone();

        let result = transition(&state, Event::Submit { settings: settings.clone() }).unwrap();
        let requested = result
            .effects
            .iter()
            .any(|e| matches!(e, Effect::RequestEvaluation { .. }));

        let should_request = !answer.trim().is_empty() && settings.has_api_key();
        prop_assert_eq!(requested, should_request);

        if answer.trim().is_empty() {
            prop_assert_eq!(result.new_state, state);
        } else if !settings.has_api_key() {
            prop_assert_eq!(result.new_state.phase, SessionPhase::Input);
            prop_assert_eq!(
                result.new_state.error.map(|e| e.kind),
                Some(ErrorKind::Configuration)
            );
        }
    }

    // Invariant 4: stale outcomes never change anything
    #[test]
    fn prop_stale_outcomes_are_ignored(
        event in arb_event(),
        evaluation in arb_evaluation(),
        error in arb_llm_error()
    ) {
        let mut state = start();
        state.answer = "an answer".to_string();
        let state = transition(&state, Event::Submit {
            settings: Settings::new("sk", "m"),
        }).unwrap().new_state;
        let ticket = state.in_flight_ticket().unwrap();

        // Any event that leaves the submission behind makes its ticket stale
        let state = match transition(&state, event) {
            Ok(result) if result.new_state.in_flight_ticket() != Some(ticket) => result.new_state,
            _ => return Ok(()),
        };

        let late_ok = transition(&state, Event::EvaluationComplete {
            ticket,
            evaluation,
            completed_at: Utc::now(),
        }).unwrap();
        prop_assert_eq!(&late_ok.new_state, &state);
        prop_assert!(late_ok.effects.is_empty());

        let late_err = transition(&state, Event::EvaluationFailed { ticket, error }).unwrap();
        prop_assert_eq!(&late_err.new_state, &state);
        prop_assert!(late_err.effects.is_empty());
    }

    // Invariant 5: failures always return to Input with a non-empty message
    #[test]
    fn prop_failure_surfaces_message(error in arb_llm_error()) {
        let mut state = start();
        state.answer = "an answer".to_string();
        let state = transition(&state, Event::Submit {
            settings: Settings::new("sk", "m"),
        }).unwrap().new_state;
        let ticket = state.in_flight_ticket().unwrap();

        let next = transition(&state, Event::EvaluationFailed { ticket, error }).unwrap().new_state;
        prop_assert_eq!(next.phase, SessionPhase::Input);
        prop_assert!(next.result.is_none());
        let shown = next.error.unwrap();
        prop_assert!(!shown.message.trim().is_empty());
    }
}
