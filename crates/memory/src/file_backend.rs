//! File-based session storage: JSON-lines snapshots.
//!
//! Each storage key maps to `<dir>/<key>.jsonl`, one JSON-encoded `Session`
//! per line. A save rewrites the whole file through a temporary sibling and
//! a rename, so a crash mid-write leaves the previous snapshot intact.
//!
//! The CLI places it at `~/.parley/sessions/chat-sessions.jsonl` unless
//! `storage.dir` says otherwise.

use async_trait::async_trait;
use parley_core::{Session, SessionPersistence, StorageError};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub struct FileSessionStorage {
    path: PathBuf,
}

impl FileSessionStorage {
    /// Storage for `key` inside `dir`. Nothing touches the disk until the
    /// first save.
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Self {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        Self {
            path: dir.as_ref().join(format!("{file_name}.jsonl")),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, e: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        }
    }
}

#[async_trait]
impl SessionPersistence for FileSessionStorage {
    fn name(&self) -> &str {
        "file"
    }

    async fn save(&self, sessions: &[Session]) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }

        let mut content = String::new();
        for session in sessions {
            let line = serde_json::to_string(session)
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            content.push_str(&line);
            content.push('\n');
        }

        let tmp = self.path.with_extension("jsonl.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;

        debug!(path = %self.path.display(), count = sessions.len(), "Sessions saved");
        Ok(())
    }

    async fn load(&self) -> Result<Vec<Session>, StorageError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        let sessions: Vec<Session> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<Session>(line) {
                Ok(session) => Some(session),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted session entry");
                    None
                }
            })
            .collect();

        debug!(path = %self.path.display(), count = sessions.len(), "Sessions loaded");
        Ok(sessions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::Message;

    #[tokio::test]
    async fn save_then_load_restores_sessions() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path(), "chat-sessions");

        let mut session = Session::new("Chat 1");
        session.push(Message::user("hello"));
        session.push(Message::assistant("hi!"));
        storage.save(&[session.clone()]).await.unwrap();

        let loaded = storage.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, session.id);
        assert_eq!(loaded[0].messages[1].content, "hi!");
        assert!(storage.path().ends_with("chat-sessions.jsonl"));
    }

    #[tokio::test]
    async fn handles_missing_file_gracefully() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path().join("not-yet"), "k");
        assert!(storage.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn handles_corrupted_lines() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path(), "k");
        let good = serde_json::to_string(&Session::new("good")).unwrap();
        std::fs::write(storage.path(), format!("{good}\nnot json\n\n")).unwrap();

        let loaded = storage.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "good");
    }

    #[tokio::test]
    async fn save_replaces_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileSessionStorage::new(dir.path(), "k");
        storage
            .save(&[Session::new("a"), Session::new("b")])
            .await
            .unwrap();
        storage.save(&[Session::new("c")]).await.unwrap();

        let loaded = storage.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].title, "c");
    }

    #[test]
    fn storage_key_is_sanitised() {
        let storage = FileSessionStorage::new("/tmp", "../evil key");
        assert_eq!(storage.path(), Path::new("/tmp/___evil_key.jsonl"));
    }
}
