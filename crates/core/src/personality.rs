//! Assistant personalities.
//!
//! A closed set: each personality maps to a system instruction for live
//! models, a heading prepended to offline replies, and a set of starter
//! prompts a front end can offer.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Personality {
    #[default]
    IntelligentAssistant,
    CreativeThinker,
    AnalyticalExpert,
    CodingAssistant,
    BusinessConsultant,
    Teacher,
    DomainSpecialist,
}

impl Personality {
    pub const ALL: [Personality; 7] = [
        Personality::IntelligentAssistant,
        Personality::CreativeThinker,
        Personality::AnalyticalExpert,
        Personality::CodingAssistant,
        Personality::BusinessConsultant,
        Personality::Teacher,
        Personality::DomainSpecialist,
    ];

    /// The configuration name (`snake_case`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Personality::IntelligentAssistant => "intelligent_assistant",
            Personality::CreativeThinker => "creative_thinker",
            Personality::AnalyticalExpert => "analytical_expert",
            Personality::CodingAssistant => "coding_assistant",
            Personality::BusinessConsultant => "business_consultant",
            Personality::Teacher => "teacher",
            Personality::DomainSpecialist => "domain_specialist",
        }
    }

    /// Extra guidance appended to the base system instruction.
    pub fn system_hint(&self) -> &'static str {
        match self {
            Personality::IntelligentAssistant => {
                "Provide clear, helpful, and accurate responses."
            }
            Personality::CreativeThinker => {
                "Approach every request creatively, offering original ideas and unexpected angles."
            }
            Personality::AnalyticalExpert => {
                "Break problems into logical components and reason about them systematically."
            }
            Personality::CodingAssistant => {
                "Focus on programming help: working code, debugging steps and best practices."
            }
            Personality::BusinessConsultant => {
                "Answer from a business perspective with strategic, practical insights."
            }
            Personality::Teacher => {
                "Teach the topic step by step using simple terms, examples and analogies."
            }
            Personality::DomainSpecialist => {
                "Act as a domain specialist and give precise, well-sourced information."
            }
        }
    }

    /// Heading placed in front of offline replies. The default personality has none.
    pub fn preamble(&self, input: &str) -> Option<String> {
        let text = match self {
            Personality::IntelligentAssistant => return None,
            Personality::CreativeThinker => format!(
                "**Creative Mode**\n\nI'm thinking creatively about \"{input}\". Let me explore this from an artistic and innovative perspective...\n\n"
            ),
            Personality::AnalyticalExpert => format!(
                "**Analytical Mode**\n\nI'm analyzing \"{input}\" systematically. Let me break this down into logical components...\n\n"
            ),
            Personality::CodingAssistant => format!(
                "**Coding Mode**\n\nI'm ready to help with programming! \"{input}\" - let me provide technical solutions...\n\n"
            ),
            Personality::BusinessConsultant => format!(
                "**Business Mode**\n\nI'm analyzing \"{input}\" from a business perspective. Let me provide strategic insights...\n\n"
            ),
            Personality::Teacher => format!(
                "**Educational Mode**\n\nI'm here to teach you about \"{input}\". Let me explain this clearly and provide examples...\n\n"
            ),
            Personality::DomainSpecialist => format!(
                "**Specialist Mode**\n\nLet me help you with \"{input}\" using accurate, focused information...\n\n"
            ),
        };
        Some(text)
    }

    pub fn starter_prompts(&self) -> &'static [&'static str] {
        match self {
            Personality::IntelligentAssistant => &[
                "Hello! How can I help you today?",
                "What would you like to learn about?",
                "I'm here to assist you. What's on your mind?",
                "What challenges can I help you solve?",
            ],
            Personality::CreativeThinker => &[
                "Let's brainstorm some creative ideas!",
                "What kind of project would you like to create?",
                "Let's design something amazing together!",
            ],
            Personality::AnalyticalExpert => &[
                "Let me break this down step by step.",
                "What specific aspects should we examine?",
                "I'll help you evaluate all the factors.",
            ],
            Personality::CodingAssistant => &[
                "What programming challenge can I help with?",
                "Let's debug this together!",
                "What language or framework are you using?",
            ],
            Personality::BusinessConsultant => &[
                "What business challenge are you facing?",
                "Let's analyze your business strategy.",
                "What's your business goal today?",
            ],
            Personality::Teacher => &[
                "What would you like to learn today?",
                "Let me break this down in simple terms.",
                "I can provide examples and analogies.",
            ],
            Personality::DomainSpecialist => &[
                "Which area should we dig into?",
                "Ask me anything about your specialist topic.",
                "Predict Manchester City vs Arsenal",
            ],
        }
    }
}

impl std::fmt::Display for Personality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Personality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        Personality::ALL
            .into_iter()
            .find(|p| p.as_str() == normalized)
            .ok_or_else(|| format!("Unknown personality: {s}"))
    }
}
