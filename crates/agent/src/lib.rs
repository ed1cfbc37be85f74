//! Chat orchestration for Parley.
//!
//! [`ChatOrchestrator`] owns the sessions and their bounded memory and
//! answers each message through an ordered chain of reply tiers:
//!
//! 1. **Prediction**: local football answers for requests that ask for them
//! 2. **Knowledge**: the retrieval service, when enabled
//! 3. **Language model**: live model, degrading to the offline responder
//!
//! If no tier produces text the reply is a canned apology. Either way the
//! user message and its reply are committed together.

pub mod attachments;
pub mod orchestrator;

pub use orchestrator::{APOLOGY, ChatOrchestrator, ChatOrchestratorBuilder, SendRequest};
