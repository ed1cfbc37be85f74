//! Session persistence trait.
//!
//! Sessions are saved as a whole snapshot under one storage key and loaded
//! back at startup. A missing snapshot is not an error.

use async_trait::async_trait;

use crate::error::StorageError;
use crate::message::Session;

#[async_trait]
pub trait SessionPersistence: Send + Sync {
    fn name(&self) -> &str;

    /// Replace the stored snapshot with `sessions`.
    async fn save(&self, sessions: &[Session]) -> Result<(), StorageError>;

    /// The stored snapshot, or an empty list if nothing was saved yet.
    async fn load(&self) -> Result<Vec<Session>, StorageError>;
}
