//! In-memory session storage: useful for testing and ephemeral runs.
//!
//! Snapshots are kept serialized, so a save/load cycle goes through the same
//! encoding as the file backend.

use async_trait::async_trait;
use parley_core::{Session, SessionPersistence, StorageError};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Clone, Default)]
pub struct InMemoryStorage {
    snapshot: Arc<RwLock<Option<String>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions in the last saved snapshot.
    pub async fn saved_count(&self) -> usize {
        self.load().await.map(|s| s.len()).unwrap_or(0)
    }
}

#[async_trait]
impl SessionPersistence for InMemoryStorage {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn save(&self, sessions: &[Session]) -> Result<(), StorageError> {
        let encoded = serde_json::to_string(sessions)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        *self.snapshot.write().await = Some(encoded);
        Ok(())
    }

    async fn load(&self) -> Result<Vec<Session>, StorageError> {
        match self.snapshot.read().await.as_deref() {
            Some(encoded) => serde_json::from_str(encoded)
                .map_err(|e| StorageError::Serialization(e.to_string())),
            None => Ok(Vec::new()),
        }
    }
}
