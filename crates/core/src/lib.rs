//! # parley Core
//!
//! Domain types, traits, and error definitions for the parley chat
//! orchestrator. This crate has **zero framework dependencies**: it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every backend is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod backend;
pub mod error;
pub mod message;
pub mod personality;
pub mod storage;

// Re-export key types at crate root for ergonomics
pub use backend::{KnowledgeSource, LanguageModel, Predictor, ResponseTier};
pub use error::{BackendError, Error, Result, SessionError, StorageError};
pub use message::{Attachment, AttachmentMeta, Message, MessageKind, Role, Session, SessionId};
pub use personality::Personality;
pub use storage::SessionPersistence;
