//! Bounded per-session context window.
//!
//! Keeps the most recent `window` messages of each session, oldest first.
//! Appending past the bound evicts from the front.

use parley_core::{Message, SessionId};
use std::collections::{HashMap, VecDeque};

pub const DEFAULT_WINDOW: usize = 10;

#[derive(Debug, Clone)]
pub struct ConversationMemory {
    window: usize,
    turns: HashMap<SessionId, VecDeque<Message>>,
}

impl ConversationMemory {
    /// A window of zero is treated as one.
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            turns: HashMap::new(),
        }
    }

    pub fn with_default_window() -> Self {
        Self::new(DEFAULT_WINDOW)
    }

    pub fn window_size(&self) -> usize {
        self.window
    }

    /// Record one exchange: the user's message, then the reply.
    pub fn append(&mut self, session_id: &SessionId, user: Message, assistant: Message) {
        self.push(session_id, user);
        self.push(session_id, assistant);
    }

    pub fn push(&mut self, session_id: &SessionId, message: Message) {
        let turns = self.turns.entry(session_id.clone()).or_default();
        turns.push_back(message);
        while turns.len() > self.window {
            turns.pop_front();
        }
    }

    /// Retained messages in insertion order. Unknown sessions have none.
    pub fn context(&self, session_id: &SessionId) -> Vec<Message> {
        self.turns
            .get(session_id)
            .map(|turns| turns.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Drop everything held for a session.
    pub fn clear(&mut self, session_id: &SessionId) -> bool {
        self.turns.remove(session_id).is_some()
    }

    pub fn session_count(&self) -> usize {
        self.turns.len()
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::with_default_window()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_session_has_empty_context() {
        let memory = ConversationMemory::default();
        assert!(memory.context(&SessionId::from("nope")).is_empty());
    }

    #[test]
    fn window_is_never_exceeded() {
        let mut memory = ConversationMemory::new(3);
        let id = SessionId::from("s");
        for i in 0..10 {
            memory.push(&id, Message::user(format!("m{i}")));
            assert!(memory.context(&id).len() <= 3);
        }
        let contents: Vec<String> = memory.context(&id).into_iter().map(|m| m.content).collect();
        assert_eq!(contents, vec!["m7", "m8", "m9"]);
    }

    #[test]
    fn fifteen_exchanges_keep_last_ten_messages() {
        let mut memory = ConversationMemory::with_default_window();
        let id = SessionId::from("s");
        for i in 0..15 {
            memory.append(
                &id,
                Message::user(format!("q{i}")),
                Message::assistant(format!("a{i}")),
            );
        }

        let context = memory.context(&id);
        assert_eq!(context.len(), 10);
        assert_eq!(context.first().unwrap().content, "q10");
        assert_eq!(context.last().unwrap().content, "a14");
    }

    #[test]
    fn sessions_are_independent() {
        let mut memory = ConversationMemory::new(2);
        let a = SessionId::from("a");
        let b = SessionId::from("b");
        memory.push(&a, Message::user("for a"));
        memory.push(&b, Message::user("for b"));

        assert_eq!(memory.context(&a)[0].content, "for a");
        assert_eq!(memory.session_count(), 2);
        assert!(memory.clear(&a));
        assert!(memory.context(&a).is_empty());
        assert_eq!(memory.context(&b).len(), 1);
    }

    #[test]
    fn zero_window_is_clamped() {
        assert_eq!(ConversationMemory::new(0).window_size(), 1);
    }
}
