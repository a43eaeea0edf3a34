//! Keyword decision table for tutor replies
//!
//! Rules are evaluated in order against the lower-cased question; the first
//! rule whose every keyword group matches wins. A group matches when the
//! question contains any one of its keywords.

/// One row of the decision table
#[derive(Debug, Clone, Copy)]
pub struct ResponseRule {
    pub topic: &'static str,
    /// All groups must match; within a group any keyword will do
    pub requires: &'static [&'static [&'static str]],
    pub response: &'static str,
}

impl ResponseRule {
    /// `question` must already be lower-cased
    pub fn matches(&self, question: &str) -> bool {
        self.requires
            .iter()
            .all(|group| group.iter().any(|keyword| question.contains(keyword)))
    }
}

pub const VARIABLE_EXPLANATION: &str = "Variables in algebra are symbols (usually letters like x, y, z) that represent unknown or changing values. For example:\n\n1. In x + 5 = 12, x is a variable standing for the unknown number (here x = 7)\n2. In the formula A = l × w, the variables l and w stand for length and width\n3. Variables let us write general rules and solve problems for many different values\n\nWould you like to see more examples or practice using variables?";

pub const EXPRESSION_EXPLANATION: &str = "An algebraic expression is a combination of variables, numbers, and mathematical operations. For example:\n\n1. 2x + 3 (a linear expression)\n2. x² - 4x + 4 (a quadratic expression)\n3. 3a + 2b - c (an expression with several variables)\n\nWe evaluate an expression by substituting values for its variables. Would you like to try some practice problems?";

pub const FRACTION_EXAMPLES: &str = "Here are some examples of fractions:\n1/2 (one-half)\n3/4 (three-quarters)\n5/8 (five-eighths)\n\nReal-world example: if you cut a pizza into 8 equal slices and eat 3 of them, you've eaten 3/8 of the pizza.";

pub const EQUATION_EXAMPLES: &str = "Here are some example equations:\n1. Simple equation: x + 5 = 12\n2. Linear equation: 2x - 3 = 7\n3. Quadratic equation: x² + 2x + 1 = 0";

pub const NATURAL_NUMBERS_EXPLANATION: &str = "Natural numbers are the counting numbers (1, 2, 3, ...) we use every day. They are the most basic set of numbers, used for counting objects and putting things in order. Unlike whole numbers, natural numbers don't include zero.";

pub const INTEGER_EXPLANATION: &str = "Integers are all whole numbers, positive and negative, together with zero: ..., -3, -2, -1, 0, 1, 2, 3, ... They are fundamental to algebra and higher mathematics.";

pub const FRACTION_EXPLANATION: &str = "A fraction represents a part of a whole. It has a numerator (top number) and a denominator (bottom number). The numerator tells us how many parts we have, and the denominator tells us how many equal parts the whole is divided into.";

pub const HELP_RESPONSE: &str = "I'll help break this down step by step. What specific part are you having trouble with? We can start with the basics and work our way up to more complex concepts.";

pub const PRACTICE_RESPONSE: &str = "Here's a practice problem for you:\n\nIf you have 3/4 of a pizza and eat 1/3 of what you have, what fraction of the original pizza do you have left?\n\nLet me know if you want help solving it!";

const DEFINITION_WORDS: &[&str] = &["what", "explain"];
const EXAMPLE_WORDS: &[&str] = &["example", "show"];

/// The built-in table, highest priority first.
///
/// Definition questions ("what"/"explain") outrank example requests, which in
/// turn outrank a bare mention of a topic.
pub fn default_rules() -> Vec<ResponseRule> {
    vec![
        ResponseRule { topic: "variables", requires: &[&["variable"]], response: VARIABLE_EXPLANATION },
        ResponseRule { topic: "expressions", requires: &[&["expression"]], response: EXPRESSION_EXPLANATION },
        ResponseRule {
            topic: "define-natural-numbers",
            requires: &[DEFINITION_WORDS, &["natural number"]],
            response: NATURAL_NUMBERS_EXPLANATION,
        },
        ResponseRule { topic: "define-integers", requires: &[DEFINITION_WORDS, &["integer"]], response: INTEGER_EXPLANATION },
        ResponseRule { topic: "define-fractions", requires: &[DEFINITION_WORDS, &["fraction"]], response: FRACTION_EXPLANATION },
        ResponseRule { topic: "fraction-examples", requires: &[EXAMPLE_WORDS, &["fraction"]], response: FRACTION_EXAMPLES },
        ResponseRule { topic: "equation-examples", requires: &[EXAMPLE_WORDS, &["equation"]], response: EQUATION_EXAMPLES },
        ResponseRule { topic: "natural-numbers", requires: &[&["natural number"]], response: NATURAL_NUMBERS_EXPLANATION },
        ResponseRule { topic: "integers", requires: &[&["integer"]], response: INTEGER_EXPLANATION },
        ResponseRule { topic: "fractions", requires: &[&["fraction"]], response: FRACTION_EXPLANATION },
        ResponseRule { topic: "help", requires: &[&["help", "stuck"]], response: HELP_RESPONSE },
        ResponseRule { topic: "practice", requires: &[&["practice", "exercise"]], response: PRACTICE_RESPONSE },
    ]
}

/// Reply used when no rule matches; quotes the original question
pub fn fallback_response(question: &str) -> String {
    format!(
        "I understand you're asking about \"{}\". Let me help explain this concept in a clear and simple way. What specific aspect would you like to understand better?",
        question
    )
}

/// First matching rule for `question`, if any
pub fn find_rule<'a>(rules: &'a [ResponseRule], question: &str) -> Option<&'a ResponseRule> {
    let lowered = question.to_lowercase();
    rules.iter().find(|rule| rule.matches(&lowered))
}
