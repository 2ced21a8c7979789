//! Practice catalog: rephrasing modes and candidate topics

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Words and phrases the learner is asked to rephrase
pub const TOPICS: &[&str] = &[
    "cucumber",
    "gravity",
    "photosynthesis",
    "I'm tired",
    "blockchain",
    "inflation",
    "democracy",
    "quantum computer",
];

/// Rephrasing style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Paraphrase,
    Circumlocution,
    #[serde(rename = "ELI5")]
    Eli5,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Paraphrase, Mode::Circumlocution, Mode::Eli5];

    pub fn label(self) -> &'static str {
        match self {
            Mode::Paraphrase => "Paraphrase",
            Mode::Circumlocution => "Circumlocution",
            Mode::Eli5 => "ELI5",
        }
    }

    /// Short instruction shown next to the mode picker
    pub fn hint(self) -> &'static str {
        match self {
            Mode::Paraphrase => "Say the same thing with different words",
            Mode::Circumlocution => "Explain it through its features or uses",
            Mode::Eli5 => "Explain it in words a five-year-old understands",
        }
    }

    /// Human-readable description embedded in feedback prompts
    pub fn description(self) -> &'static str {
        match self {
            Mode::Paraphrase => "paraphrase (express the same meaning with different wording)",
            Mode::Circumlocution => {
                "circumlocution (describe it by its features, purpose or use without naming it)"
            }
            Mode::Eli5 => "explain like I'm five (use words a young child would understand)",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A topic drawn from [`TOPICS`]
///
/// There is no way to build one from arbitrary text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Topic(&'static str);

impl Topic {
    /// Pick uniformly at random from the catalog
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        // TOPICS is a non-empty constant
        Topic(TOPICS.choose(rng).copied().unwrap_or(TOPICS[0]))
    }

    /// Look up a catalog entry by its exact text
    #[cfg(test)]
    pub fn from_catalog(text: &str) -> Option<Self> {
        TOPICS.iter().copied().find(|t| *t == text).map(Topic)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_topic_is_from_catalog() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let topic = Topic::random(&mut rng);
            assert!(TOPICS.contains(&topic.as_str()));
        }
    }

    #[test]
    fn test_random_topic_covers_catalog() {
        let mut rng = StdRng::seed_from_u64(42);
        let seen: std::collections::HashSet<_> =
            (0..500).map(|_| Topic::random(&mut rng).as_str()).collect();
        assert_eq!(seen.len(), TOPICS.len());
    }

    #[test]
    fn test_from_catalog_rejects_unknown_text() {
        assert_eq!(Topic::from_catalog("gravity").unwrap().as_str(), "gravity");
        assert!(Topic::from_catalog("Gravity").is_none());
        assert!(Topic::from_catalog("teapot").is_none());
    }

    #[test]
    fn test_mode_serialization() {
        assert_eq!(serde_json::to_string(&Mode::Eli5).unwrap(), "\"ELI5\"");
        assert_eq!(
            serde_json::from_str::<Mode>("\"Circumlocution\"").unwrap(),
            Mode::Circumlocution
        );
        assert_eq!(Mode::default(), Mode::Paraphrase);
    }

    #[test]
    fn test_modes_have_distinct_hints() {
        let hints: std::collections::HashSet<_> = Mode::ALL.iter().map(|m| m.hint()).collect();
        assert_eq!(hints.len(), Mode::ALL.len());
    }
}
