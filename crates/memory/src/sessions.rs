//! In-memory session registry.
//!
//! Sessions are listed most recently updated first. Sessions updated at the
//! same instant keep the order in which they were added to the store.

use parley_core::{Message, Session, SessionError, SessionId};
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct Entry {
    session: Session,
    seq: u64,
}

#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: HashMap<SessionId, Entry>,
    next_seq: u64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty session. Without a title it is called "Chat N".
    pub fn create(&mut self, title: Option<&str>) -> Session {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .unwrap_or_else(|| format!("Chat {}", self.sessions.len() + 1));
        let session = Session::new(title);
        self.insert(session.clone());
        session
    }

    fn insert(&mut self, session: Session) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.sessions
            .insert(session.id.clone(), Entry { session, seq });
    }

    pub fn get(&self, id: &SessionId) -> Option<&Session> {
        self.sessions.get(id).map(|e| &e.session)
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn list(&self) -> Vec<&Session> {
        let mut entries: Vec<&Entry> = self.sessions.values().collect();
        entries.sort_by(|a, b| {
            b.session
                .updated_at
                .cmp(&a.session.updated_at)
                .then(a.seq.cmp(&b.seq))
        });
        entries.into_iter().map(|e| &e.session).collect()
    }

    /// Returns `false` if the session did not exist.
    pub fn delete(&mut self, id: &SessionId) -> bool {
        self.sessions.remove(id).is_some()
    }

    pub fn append(&mut self, id: &SessionId, message: Message) -> Result<&Session, SessionError> {
        let entry = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.clone()))?;
        entry.session.push(message);
        Ok(&entry.session)
    }

    /// Append a user message and its reply together.
    pub fn append_exchange(
        &mut self,
        id: &SessionId,
        user: Message,
        assistant: Message,
    ) -> Result<&Session, SessionError> {
        let entry = self
            .sessions
            .get_mut(id)
            .ok_or_else(|| SessionError::NotFound(id.clone()))?;
        entry.session.push(user);
        entry.session.push(assistant);
        Ok(&entry.session)
    }

    /// Replace the contents with previously saved sessions, keeping their order.
    pub fn restore(&mut self, sessions: Vec<Session>) {
        self.sessions.clear();
        self.next_seq = 0;
        for session in sessions {
            self.insert(session);
        }
    }

    /// All sessions in listing order, for persistence.
    pub fn snapshot(&self) -> Vec<Session> {
        self.list().into_iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn create_assigns_default_titles() {
        let mut store = SessionStore::new();
        assert_eq!(store.create(None).title, "Chat 1");
        assert_eq!(store.create(Some("  ")).title, "Chat 2");
        assert_eq!(store.create(Some("Trip plans")).title, "Trip plans");
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn list_orders_by_recent_update() {
        let mut store = SessionStore::new();
        let first = store.create(Some("first")).id;
        let second = store.create(Some("second")).id;

        store.append(&first, Message::user("bump")).unwrap();
        let titles: Vec<&str> = store.list().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles[0], "first");
        assert!(store.get(&second).is_some());
    }

    #[test]
    fn ties_keep_insertion_order() {
        let mut store = SessionStore::new();
        let stamp = Utc::now() - Duration::seconds(60);
        let sessions: Vec<Session> = ["a", "b", "c"]
            .into_iter()
            .map(|t| {
                let mut s = Session::new(t);
                s.created_at = stamp;
                s.updated_at = stamp;
                s
            })
            .collect();
        store.restore(sessions);

        let titles: Vec<&str> = store.list().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b", "c"]);
    }

    #[test]
    fn append_to_missing_session_fails() {
        let mut store = SessionStore::new();
        let err = store
            .append(&SessionId::from("ghost"), Message::user("hi"))
            .unwrap_err();
        assert!(matches!(err, SessionError::NotFound(_)));
    }

    #[test]
    fn exchange_is_appended_in_order() {
        let mut store = SessionStore::new();
        let id = store.create(None).id;
        let session = store
            .append_exchange(&id, Message::user("q"), Message::assistant("a"))
            .unwrap();
        assert_eq!(session.messages.len(), 2);
        assert_eq!(session.messages[0].content, "q");
        assert_eq!(session.messages[1].content, "a");
    }

    #[test]
    fn delete_reports_existence() {
        let mut store = SessionStore::new();
        let id = store.create(None).id;
        assert!(store.delete(&id));
        assert!(!store.delete(&id));
        assert!(store.get(&id).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn snapshot_round_trips_through_restore() {
        let mut store = SessionStore::new();
        let id = store.create(Some("kept")).id;
        store.append(&id, Message::user("hello")).unwrap();

        let mut restored = SessionStore::new();
        restored.restore(store.snapshot());
        assert_eq!(restored.get(&id).unwrap().messages.len(), 1);
    }
}
