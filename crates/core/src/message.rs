//! Message and Session domain types.
//!
//! These are the value objects that flow through the whole system:
//! the user sends a message, the orchestrator picks a backend, the reply is
//! appended to the session next to the user's turn.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a chat session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a message sender in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The assistant
    Assistant,
    /// System instructions
    System,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
            Role::System => "System",
        }
    }
}

/// What a message carries besides its text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    #[default]
    Text,
    Image,
    File,
    Search,
}

/// Metadata of a file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentMeta {
    pub file_name: String,
    pub file_size: u64,
    pub file_type: String,
}

/// A file handed to `send_message`. Only its metadata is ever read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
}

impl Attachment {
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
        }
    }

    pub fn meta(&self) -> AttachmentMeta {
        AttachmentMeta {
            file_name: self.name.clone(),
            file_size: self.size,
            file_type: self.mime_type.clone(),
        }
    }

    /// Image attachments get their own message kind.
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// A single message in a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Unique message ID
    pub id: String,

    /// Who sent this message
    pub role: Role,

    /// The text content
    pub content: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,

    #[serde(default)]
    pub kind: MessageKind,

    /// Present for file and image messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<AttachmentMeta>,
}

impl Message {
    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
            kind: MessageKind::Text,
            attachment: None,
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content)
    }

    pub fn with_kind(mut self, kind: MessageKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_attachment(mut self, meta: AttachmentMeta) -> Self {
        self.attachment = Some(meta);
        self
    }
}

/// A session is an ordered, append-only sequence of messages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique session ID
    pub id: SessionId,

    /// Display title
    pub title: String,

    /// Ordered messages
    pub messages: Vec<Message>,

    /// When this session was created
    pub created_at: DateTime<Utc>,

    /// When the last message was added
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// Create a new empty session.
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            title: title.into(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Add a message. `updated_at` never moves backwards, even if the wall
    /// clock does.
    pub fn push(&mut self, message: Message) {
        self.updated_at = Utc::now().max(self.updated_at);
        self.messages.push(message);
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_message() {
        let msg = Message::user("Hello there");
        assert_eq!(msg.role, Role::User);
        assert_eq!(msg.content, "Hello there");
        assert_eq!(msg.kind, MessageKind::Text);
        assert!(msg.attachment.is_none());
    }

    #[test]
    fn session_tracks_updates() {
        let mut session = Session::new("Chat 1");
        let created = session.created_at;

        session.push(Message::user("First message"));
        assert_eq!(session.messages.len(), 1);
        assert!(session.updated_at >= created);
        assert_eq!(session.last_message().map(|m| m.role), Some(Role::User));
    }

    #[test]
    fn message_kind_serializes_lowercase() {
        let msg = Message::user("Uploaded 1 file(s)")
            .with_kind(MessageKind::File)
            .with_attachment(Attachment::new("notes.txt", 12, "text/plain").meta());
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["kind"], "file");
        assert_eq!(json["role"], "user");
        assert_eq!(json["attachment"]["file_name"], "notes.txt");
    }

    #[test]
    fn message_without_kind_defaults_to_text() {
        let json = r#"{"id":"1","role":"assistant","content":"hi","timestamp":"2024-01-01T00:00:00Z"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.kind, MessageKind::Text);
    }

    #[test]
    fn image_attachment_detection() {
        assert!(Attachment::new("a.png", 1, "image/png").is_image());
        assert!(!Attachment::new("a.pdf", 1, "application/pdf").is_image());
    }
}
