//! Backend traits: the capabilities the orchestrator can draw a reply from.
//!
//! The orchestrator receives these as trait objects, so tests swap in
//! scripted implementations and deployments decide which ones exist.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::message::{Message, SessionId};

/// Produces assistant text from user input and recent context.
///
/// Implementations must always return text. Remote failures are handled
/// internally by degrading to an offline reply.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, input: &str, context: &[Message]) -> String;
}

/// A retrieval-augmented knowledge service.
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    fn name(&self) -> &str;

    /// Snippets relevant to `query`, best first.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<String>, BackendError>;

    /// A reply grounded in the service's knowledge.
    async fn enhanced_response(
        &self,
        message: &str,
        session_id: &SessionId,
        use_augmentation: bool,
    ) -> Result<String, BackendError>;

    /// Record a finished exchange so later answers can draw on it.
    async fn store_conversation(
        &self,
        user_message: &str,
        ai_response: &str,
        session_id: &SessionId,
    ) -> Result<(), BackendError>;
}

/// A local, synchronous domain responder (match predictions).
pub trait Predictor: Send + Sync {
    fn name(&self) -> &str;

    /// Whether `input` asks for something this predictor answers.
    fn matches(&self, input: &str) -> bool;

    fn respond(&self, input: &str) -> String;
}

/// One stage of the reply fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseTier {
    Prediction,
    Knowledge,
    LanguageModel,
}

impl ResponseTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseTier::Prediction => "prediction",
            ResponseTier::Knowledge => "knowledge",
            ResponseTier::LanguageModel => "language_model",
        }
    }

    pub fn default_order() -> Vec<ResponseTier> {
        vec![
            ResponseTier::Prediction,
            ResponseTier::Knowledge,
            ResponseTier::LanguageModel,
        ]
    }
}

impl std::fmt::Display for ResponseTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tiers_deserialize_from_snake_case() {
        let order: Vec<ResponseTier> =
            serde_json::from_str(r#"["knowledge","language_model"]"#).unwrap();
        assert_eq!(order, vec![ResponseTier::Knowledge, ResponseTier::LanguageModel]);
    }

    #[test]
    fn default_order_puts_predictions_first() {
        assert_eq!(ResponseTier::default_order()[0], ResponseTier::Prediction);
        assert_eq!(
            ResponseTier::default_order().last(),
            Some(&ResponseTier::LanguageModel)
        );
    }
}
