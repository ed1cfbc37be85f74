//! Knowledge service client for parley.
//!
//! Talks JSON over HTTP to a retrieval-augmented service: similarity search,
//! grounded replies, conversation storage and a handful of record operations
//! (locations, spaces, assets) scoped to one user id.

pub mod client;
pub mod records;

pub use client::KnowledgeClient;
pub use records::{AssetUpdate, LocationUpdate, NewLocation, SpaceUpdate};
