//! Session state and persistence for parley.
//!
//! `SessionStore` and `ConversationMemory` are plain single-owner structures;
//! callers that share them across tasks wrap them in a lock.

pub mod conversation;
pub mod file_backend;
pub mod in_memory;
pub mod noop;
pub mod sessions;

pub use conversation::ConversationMemory;
pub use file_backend::FileSessionStorage;
pub use in_memory::InMemoryStorage;
pub use noop::NoopStorage;
pub use sessions::SessionStore;
