//! Fixed practice exercise bank

use serde::{Deserialize, Serialize};

/// Topic served when the requested one is unknown
pub const DEFAULT_TOPIC: &str = "fractions";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub question: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Exercise {
    /// Case- and whitespace-insensitive answer check
    pub fn is_correct(&self, answer: &str) -> bool {
        answer.trim().eq_ignore_ascii_case(self.correct_answer.trim())
    }
}

fn multiple_choice(question: &str, options: &[&str], correct: &str, explanation: &str) -> Exercise {
    Exercise {
        question: question.to_string(),
        options: Some(options.iter().map(|o| o.to_string()).collect()),
        correct_answer: correct.to_string(),
        explanation: Some(explanation.to_string()),
    }
}

/// Exercise for `topic`.
///
/// Unknown topics get the fractions exercise.
pub fn exercise_for(topic: &str) -> Exercise {
    match topic.trim().to_lowercase().as_str() {
        "natural-numbers" => multiple_choice(
            "Which of the following is NOT a natural number?",
            &["1", "0", "5", "10"],
            "0",
            "Natural numbers are the counting numbers starting from 1. Zero is a whole number but not a natural number.",
        ),
        "fractions" => fractions(),
        other => {
            tracing::debug!("No exercise for topic '{}', using '{}'", other, DEFAULT_TOPIC);
            fractions()
        }
    }
}

/// Topics with a dedicated exercise
pub fn topics() -> &'static [&'static str] {
    &["natural-numbers", "fractions"]
}

fn fractions() -> Exercise {
    multiple_choice(
        "If you have 3/4 of a pizza and eat 1/3 of what you have, what fraction of the original pizza do you have left?",
        &["1/2", "1/4", "1/3", "2/4"],
        "1/2",
        "1) Find 1/3 of 3/4: 1/3 × 3/4 = 1/4\n2) Subtract it from what you had: 3/4 - 1/4 = 2/4 = 1/2",
    )
}
