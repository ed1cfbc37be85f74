//! Reply generators for parley.
//!
//! `LanguageModelBackend` implements the `parley_core::LanguageModel` trait:
//! a live OpenAI-compatible completion with an offline keyword responder
//! behind it.

pub mod arithmetic;
pub mod heuristic;
pub mod language_model;
pub mod openai_compat;

pub use heuristic::{HeuristicResponder, Reply, ReplyCategory};
pub use language_model::LanguageModelBackend;
pub use openai_compat::OpenAiCompatClient;
