//! Offline replies from keyword templates.
//!
//! The responder never touches the network. It lowercases the input, splits
//! it into words and picks the first matching category. Arithmetic is checked
//! first so "What is 6 * 7?" is answered with 42 rather than an explanation.
//! Within a category the template is chosen by a stable hash of the input,
//! so a given input always gets the same reply.

use parley_core::Personality;

use crate::arithmetic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyCategory {
    Math,
    Greeting,
    Gratitude,
    Explanation,
    Code,
    Joke,
    MathHelp,
    Weather,
    General,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub category: ReplyCategory,
    pub text: String,
}

const GREETING_WORDS: &[&str] = &["hello", "hi", "hey", "greetings", "howdy"];
const GRATITUDE_WORDS: &[&str] = &["thank", "thanks", "thx"];
const EXPLAIN_WORDS: &[&str] = &["explain", "how", "why"];
const CODE_WORDS: &[&str] = &[
    "code",
    "coding",
    "programming",
    "javascript",
    "typescript",
    "python",
    "react",
    "rust",
];
const JOKE_WORDS: &[&str] = &["joke", "jokes", "funny"];
const MATH_WORDS: &[&str] = &["math", "calculate", "calculation"];
const WEATHER_WORDS: &[&str] = &["weather", "forecast", "temperature"];

const EXPLANATIONS: &[&str] = &[
    "I'll explain that for you! Let me break it down step by step. This is a great question that deserves a comprehensive answer.",
    "Good question! Let's walk through it one piece at a time so each step makes sense before moving on.",
];
const CODE_REPLIES: &[&str] = &[
    "I'd be happy to help with programming! What specific question do you have about coding?",
    "Let's write some code together! Share the language you're using and what you're trying to build.",
];
const JOKES: &[&str] = &[
    "Why don't programmers like nature? It has too many bugs!",
    "Why do Java developers wear glasses? Because they don't C#!",
];

const MATH_HELP: &str =
    "I can help with math! Please provide a simple calculation like '2 + 2' or '10 * 5'.";
const WEATHER_REPLY: &str = "I'd be happy to help with weather information! However, I don't have access to real-time weather data.";
const GRATITUDE_REPLY: &str = "You're welcome! Is there anything else I can help you with?";

/// Keyword-driven template engine.
#[derive(Debug, Clone)]
pub struct HeuristicResponder {
    assistant_name: String,
    personality: Personality,
}

impl HeuristicResponder {
    pub fn new(assistant_name: impl Into<String>) -> Self {
        Self {
            assistant_name: assistant_name.into(),
            personality: Personality::default(),
        }
    }

    pub fn with_personality(mut self, personality: Personality) -> Self {
        self.personality = personality;
        self
    }

    /// Which template family `input` falls into.
    pub fn classify(&self, input: &str) -> ReplyCategory {
        if arithmetic::extract_expression(input)
            .is_some_and(|expr| arithmetic::evaluate(&expr).is_ok())
        {
            return ReplyCategory::Math;
        }

        let lowered = input.to_lowercase();
        let words: Vec<&str> = lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();
        let has_any = |list: &[&str]| words.iter().any(|w| list.contains(w));

        if has_any(GREETING_WORDS) {
            ReplyCategory::Greeting
        } else if has_any(GRATITUDE_WORDS) {
            ReplyCategory::Gratitude
        } else if has_any(EXPLAIN_WORDS) {
            ReplyCategory::Explanation
        } else if has_any(CODE_WORDS) {
            ReplyCategory::Code
        } else if has_any(JOKE_WORDS) {
            ReplyCategory::Joke
        } else if has_any(MATH_WORDS) || arithmetic::extract_expression(input).is_some() {
            ReplyCategory::MathHelp
        } else if has_any(WEATHER_WORDS) {
            ReplyCategory::Weather
        } else {
            ReplyCategory::General
        }
    }

    pub fn respond(&self, input: &str) -> Reply {
        let category = self.classify(input);
        let body = match category {
            ReplyCategory::Math => self.calculate(input),
            ReplyCategory::Greeting => format!(
                "Hello! I'm {}, your intelligent assistant. How can I help you today?",
                self.assistant_name
            ),
            ReplyCategory::Gratitude => GRATITUDE_REPLY.to_string(),
            ReplyCategory::Explanation => pick(EXPLANATIONS, input).to_string(),
            ReplyCategory::Code => pick(CODE_REPLIES, input).to_string(),
            ReplyCategory::Joke => pick(JOKES, input).to_string(),
            ReplyCategory::MathHelp => MATH_HELP.to_string(),
            ReplyCategory::Weather => WEATHER_REPLY.to_string(),
            ReplyCategory::General => format!(
                "That's an interesting question about \"{}\". Let me think about this and provide you with a comprehensive answer. I'm here to help!",
                input.trim()
            ),
        };

        let text = match self.personality.preamble(input.trim()) {
            Some(preamble) => format!("{preamble}{body}"),
            None => body,
        };
        Reply { category, text }
    }

    fn calculate(&self, input: &str) -> String {
        arithmetic::extract_expression(input)
            .and_then(|expr| {
                arithmetic::evaluate(&expr)
                    .ok()
                    .map(|value| format!("The result of {} is {}", expr, arithmetic::format_number(value)))
            })
            .unwrap_or_else(|| MATH_HELP.to_string())
    }
}

/// Stable choice among variants (FNV-1a over the input bytes).
fn pick<'a>(variants: &[&'a str], input: &str) -> &'a str {
    let hash = input
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325_u64, |h, b| {
            (h ^ u64::from(b)).wrapping_mul(0x0000_0100_0000_01b3)
        });
    variants[(hash % variants.len() as u64) as usize]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn responder() -> HeuristicResponder {
        HeuristicResponder::new("Parley")
    }

    #[test]
    fn hello_gets_a_greeting() {
        let reply = responder().respond("hello");
        assert_eq!(reply.category, ReplyCategory::Greeting);
        assert!(reply.text.contains("Parley"));
    }

    #[test]
    fn question_with_arithmetic_is_evaluated() {
        let reply = responder().respond("What is 6 * 7?");
        assert_eq!(reply.category, ReplyCategory::Math);
        assert!(reply.text.contains("42"));
    }

    #[test]
    fn bare_expression_is_evaluated() {
        assert_eq!(responder().respond("12 * 4").text, "The result of 12 * 4 is 48");
    }

    #[test]
    fn unsafe_math_degrades_to_help() {
        let reply = responder().respond("calculate 1 / 0 please");
        assert_eq!(reply.category, ReplyCategory::MathHelp);
        assert_eq!(reply.text, MATH_HELP);
    }

    #[test]
    fn overflowing_math_never_answers_nan() {
        let big = "9".repeat(200);
        let reply = responder().respond(&format!("What is {big} * {big} - {big} * {big}?"));
        assert_eq!(reply.category, ReplyCategory::MathHelp);
        assert_eq!(reply.text, MATH_HELP);
        assert!(!reply.text.contains("NaN"));
    }

    #[test]
    fn words_are_matched_whole() {
        // "this" and "which" contain "hi" but are not greetings
        assert_ne!(
            responder().classify("which of this is better"),
            ReplyCategory::Greeting
        );
    }

    #[test]
    fn category_order_follows_keyword_priority() {
        let r = responder();
        assert_eq!(r.classify("explain python decorators"), ReplyCategory::Explanation);
        assert_eq!(r.classify("python code review"), ReplyCategory::Code);
        assert_eq!(r.classify("tell me a joke"), ReplyCategory::Joke);
        assert_eq!(r.classify("will the weather be nice"), ReplyCategory::Weather);
        assert_eq!(r.classify("thanks a lot"), ReplyCategory::Gratitude);
        assert_eq!(r.classify("tell me about octopuses"), ReplyCategory::General);
    }

    #[test]
    fn same_input_same_reply() {
        let r = responder();
        for input in ["tell me a joke", "explain closures", "random musing"] {
            assert_eq!(r.respond(input), r.respond(input));
        }
    }

    #[test]
    fn generic_reply_quotes_input() {
        let reply = responder().respond("  tell me about octopuses ");
        assert!(reply.text.contains("\"tell me about octopuses\""));
    }

    #[test]
    fn personality_adds_preamble() {
        let reply = responder()
            .with_personality(Personality::Teacher)
            .respond("hello");
        assert!(reply.text.starts_with("**Educational Mode**"));
        assert!(reply.text.contains("Parley"));
    }
}
