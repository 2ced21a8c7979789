//! Prompt templates for the two evaluation steps

use crate::practice::{Mode, Topic};

/// Marks the strength called out in feedback
pub const STRENGTH_PREFIX: &str = "✅";
/// Marks the suggested improvement in feedback
pub const IMPROVEMENT_PREFIX: &str = "🔧";

pub const EXAMPLE_TEMPERATURE: f32 = 0.7;
pub const FEEDBACK_TEMPERATURE: f32 = 0.8;

pub const EXAMPLE_SYSTEM_PROMPT: &str = "You are a friendly language coach who helps learners \
practice paraphrasing and explaining ideas in their own words. Answer with the requested text \
only, in two or three sentences at most.";

/// User message for step 1
pub fn example_prompt(mode: Mode, topic: &Topic) -> String {
    match mode {
        Mode::Paraphrase => format!(
            "Rephrase \"{topic}\" using different words while keeping exactly the same meaning."
        ),
        Mode::Circumlocution => format!(
            "Describe \"{topic}\" through its features, purpose or typical use, \
             without saying \"{topic}\" itself."
        ),
        Mode::Eli5 => format!(
            "Explain \"{topic}\" so that a five-year-old could understand it, \
             using short sentences and everyday words."
        ),
    }
}

/// System message for step 2
pub fn feedback_system_prompt() -> String {
    format!(
        "You are an encouraging language coach reviewing a learner's answer. \
         Reply in exactly three parts:\n\
         1. One specific strength of the answer, on a line starting with \"{STRENGTH_PREFIX} \".\n\
         2. One concrete improvement, on a line starting with \"{IMPROVEMENT_PREFIX} \".\n\
         3. A single closing sentence of encouragement.\n\
         Use the model example only as a reference; do not demand that the learner copy it."
    )
}

/// User message for step 2
pub fn feedback_prompt(topic: &Topic, mode: Mode, answer: &str, example: &str) -> String {
    format!(
        "Topic: {topic}\n\
         Mode: {}\n\n\
         Learner's answer:\n{answer}\n\n\
         Model example:\n{example}",
        mode.description()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_prompts_differ_per_mode() {
        let topic = Topic::from_catalog("inflation").unwrap();
        let prompts: std::collections::HashSet<_> = Mode::ALL
            .iter()
            .map(|m| example_prompt(*m, &topic))
            .collect();
        assert_eq!(prompts.len(), 3);
        assert!(prompts.iter().all(|p| p.contains("inflation")));
    }

    #[test]
    fn test_feedback_system_prompt_names_both_prefixes() {
        let prompt = feedback_system_prompt();
        assert!(prompt.contains(STRENGTH_PREFIX));
        assert!(prompt.contains(IMPROVEMENT_PREFIX));
    }
}
