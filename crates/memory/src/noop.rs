//! No-op session storage: disables persistence entirely.

use async_trait::async_trait;
use parley_core::{Session, SessionPersistence, StorageError};

/// Stores nothing and always loads an empty list.
pub struct NoopStorage;

#[async_trait]
impl SessionPersistence for NoopStorage {
    fn name(&self) -> &str {
        "none"
    }

    async fn save(&self, _sessions: &[Session]) -> Result<(), StorageError> {
        Ok(())
    }

    async fn load(&self) -> Result<Vec<Session>, StorageError> {
        Ok(Vec::new())
    }
}
