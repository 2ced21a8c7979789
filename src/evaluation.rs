//! Two-step evaluation protocol
//!
//! Step 1 asks the endpoint for a model example of the topic in the chosen
//! mode. Step 2 asks for coaching feedback comparing the learner's answer to
//! that example. The steps run strictly one after the other, and an
//! [`Evaluation`] only exists once both have succeeded.

pub mod prompts;

use crate::llm::{ChatMessage, CompletionClient, LlmError, LlmRequest};
use crate::practice::{Mode, Topic};
use prompts::{
    example_prompt, feedback_prompt, feedback_system_prompt, EXAMPLE_SYSTEM_PROMPT,
    EXAMPLE_TEMPERATURE, FEEDBACK_TEMPERATURE,
};
use serde::Serialize;

/// Everything one submission needs, captured at submit time
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRequest {
    pub api_key: String,
    pub model: String,
    pub topic: Topic,
    pub mode: Mode,
    pub answer: String,
}

/// Outcome of both protocol steps
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    #[serde(skip)]
    topic: Topic,
    #[serde(skip)]
    mode: Mode,
    #[serde(skip)]
    user_answer: String,
    example: String,
    feedback: String,
}

impl Evaluation {
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn user_answer(&self) -> &str {
        &self.user_answer
    }

    pub fn example(&self) -> &str {
        &self.example
    }

    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    #[cfg(test)]
    pub fn for_test(topic: &str, mode: Mode, answer: &str, example: &str, feedback: &str) -> Self {
        Self {
            topic: Topic::from_catalog(topic).unwrap_or_else(|| panic!("unknown topic {topic}")),
            mode,
            user_answer: answer.to_string(),
            example: example.to_string(),
            feedback: feedback.to_string(),
        }
    }
}

/// Run both steps against `client`.
///
/// Errors from either step are returned unchanged. A step 1 failure means
/// step 2 is never sent.
pub async fn evaluate<C>(client: &C, request: &EvaluationRequest) -> Result<Evaluation, LlmError>
where
    C: CompletionClient + ?Sized,
{
    let example_request = LlmRequest::new(
        request.model.clone(),
        vec![
            ChatMessage::system(EXAMPLE_SYSTEM_PROMPT),
            ChatMessage::user(example_prompt(request.mode, &request.topic)),
        ],
    )
    .with_temperature(EXAMPLE_TEMPERATURE);

    let example = client.complete(&request.api_key, &example_request).await?;
    tracing::debug!(topic = %request.topic, mode = %request.mode, "Model example generated");

    let feedback_request = LlmRequest::new(
        request.model.clone(),
        vec![
            ChatMessage::system(feedback_system_prompt()),
            ChatMessage::user(feedback_prompt(
                &request.topic,
                request.mode,
                &request.answer,
                &example,
            )),
        ],
    )
    .with_temperature(FEEDBACK_TEMPERATURE);

    let feedback = client.complete(&request.api_key, &feedback_request).await?;

    Ok(Evaluation {
        topic: request.topic.clone(),
        mode: request.mode,
        user_answer: request.answer.clone(),
        example,
        feedback,
    })
}
