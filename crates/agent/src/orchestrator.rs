//! The chat orchestrator.
//!
//! A `send_message` call composes the user's message, asks the configured
//! tiers for a reply and then commits both messages together. Nothing is
//! written to the session until the reply exists, so a session never holds
//! a user message without its answer. Backend failures, timeouts and panics
//! all end in some reply, the canned apology being the last one.

use std::collections::HashMap;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::FutureExt;
use parley_config::AppConfig;
use parley_core::{
    Attachment, BackendError, Error, KnowledgeSource, LanguageModel, Message, MessageKind,
    Predictor, ResponseTier, Result, Session, SessionError, SessionId, SessionPersistence,
};
use parley_memory::conversation::DEFAULT_WINDOW;
use parley_memory::{ConversationMemory, SessionStore};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::attachments;

/// Reply used when no tier produced text, or generation panicked.
pub const APOLOGY: &str = "I'm sorry, but something went wrong. Please try again.";

/// Prompt sent to the backends when the user sent files and no text.
const FILES_ONLY_PROMPT: &str = "Analyze the uploaded files";

const DEFAULT_KNOWLEDGE_TIMEOUT: Duration = Duration::from_secs(10);

/// One user turn.
#[derive(Debug, Clone)]
pub struct SendRequest {
    pub session_id: SessionId,
    pub content: String,
    pub attachments: Vec<Attachment>,
    pub search_web: bool,
}

impl SendRequest {
    pub fn new(session_id: SessionId, content: impl Into<String>) -> Self {
        Self {
            session_id,
            content: content.into(),
            attachments: Vec::new(),
            search_web: false,
        }
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn with_web_search(mut self, enabled: bool) -> Self {
        self.search_web = enabled;
        self
    }
}

struct ChatState {
    sessions: SessionStore,
    memory: ConversationMemory,
}

struct Reply {
    text: String,
    kind: MessageKind,
    /// `None` for the canned apology.
    tier: Option<ResponseTier>,
}

impl Reply {
    fn apology() -> Self {
        Self {
            text: APOLOGY.to_string(),
            kind: MessageKind::Text,
            tier: None,
        }
    }
}

pub struct ChatOrchestratorBuilder {
    language_model: Option<Arc<dyn LanguageModel>>,
    knowledge: Option<Arc<dyn KnowledgeSource>>,
    predictor: Option<Arc<dyn Predictor>>,
    persistence: Option<Arc<dyn SessionPersistence>>,
    order: Vec<ResponseTier>,
    predictions_enabled: bool,
    knowledge_enabled: bool,
    use_augmentation: bool,
    search_k: usize,
    knowledge_timeout: Duration,
    context_window: usize,
}

impl Default for ChatOrchestratorBuilder {
    fn default() -> Self {
        Self {
            language_model: None,
            knowledge: None,
            predictor: None,
            persistence: None,
            order: ResponseTier::default_order(),
            predictions_enabled: true,
            knowledge_enabled: false,
            use_augmentation: true,
            search_k: 5,
            knowledge_timeout: DEFAULT_KNOWLEDGE_TIMEOUT,
            context_window: DEFAULT_WINDOW,
        }
    }
}

impl ChatOrchestratorBuilder {
    /// Take routing, memory and knowledge settings from the app config.
    pub fn config(mut self, config: &AppConfig) -> Self {
        self.order = config.routing.order.clone();
        self.predictions_enabled = config.routing.predictions_enabled;
        self.knowledge_enabled = config.knowledge.enabled;
        self.use_augmentation = config.knowledge.use_augmentation;
        self.search_k = config.knowledge.search_k;
        self.knowledge_timeout = Duration::from_secs(config.knowledge.timeout_secs);
        self.context_window = config.memory.context_window_size;
        self
    }

    pub fn language_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.language_model = Some(model);
        self
    }

    pub fn knowledge(mut self, knowledge: Arc<dyn KnowledgeSource>) -> Self {
        self.knowledge = Some(knowledge);
        self
    }

    pub fn predictor(mut self, predictor: Arc<dyn Predictor>) -> Self {
        self.predictor = Some(predictor);
        self
    }

    pub fn persistence(mut self, persistence: Arc<dyn SessionPersistence>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    pub fn tier_order(mut self, order: Vec<ResponseTier>) -> Self {
        self.order = order;
        self
    }

    pub fn predictions_enabled(mut self, enabled: bool) -> Self {
        self.predictions_enabled = enabled;
        self
    }

    pub fn knowledge_enabled(mut self, enabled: bool) -> Self {
        self.knowledge_enabled = enabled;
        self
    }

    pub fn use_augmentation(mut self, enabled: bool) -> Self {
        self.use_augmentation = enabled;
        self
    }

    pub fn search_k(mut self, k: usize) -> Self {
        self.search_k = k;
        self
    }

    pub fn knowledge_timeout(mut self, timeout: Duration) -> Self {
        self.knowledge_timeout = timeout;
        self
    }

    pub fn context_window(mut self, size: usize) -> Self {
        self.context_window = size;
        self
    }

    pub fn build(self) -> Result<ChatOrchestrator> {
        let language_model = self.language_model.ok_or_else(|| Error::Config {
            message: "a language model backend is required".into(),
        })?;

        let mut order: Vec<ResponseTier> = Vec::new();
        for tier in self.order {
            if tier == ResponseTier::Prediction && !self.predictions_enabled {
                continue;
            }
            if !order.contains(&tier) {
                order.push(tier);
            }
        }
        if !order.contains(&ResponseTier::LanguageModel) {
            order.push(ResponseTier::LanguageModel);
        }

        Ok(ChatOrchestrator {
            language_model,
            knowledge: self.knowledge,
            predictor: self.predictor,
            persistence: self.persistence,
            order,
            knowledge_enabled: AtomicBool::new(self.knowledge_enabled),
            use_augmentation: self.use_augmentation,
            search_k: self.search_k,
            knowledge_timeout: self.knowledge_timeout,
            context_window: self.context_window,
            state: Mutex::new(ChatState {
                sessions: SessionStore::new(),
                memory: ConversationMemory::new(self.context_window),
            }),
            session_locks: Mutex::new(HashMap::new()),
            save_lock: Mutex::new(()),
        })
    }
}

pub struct ChatOrchestrator {
    language_model: Arc<dyn LanguageModel>,
    knowledge: Option<Arc<dyn KnowledgeSource>>,
    predictor: Option<Arc<dyn Predictor>>,
    persistence: Option<Arc<dyn SessionPersistence>>,
    order: Vec<ResponseTier>,
    knowledge_enabled: AtomicBool,
    use_augmentation: bool,
    search_k: usize,
    knowledge_timeout: Duration,
    context_window: usize,
    state: Mutex<ChatState>,
    /// One turn at a time per session.
    session_locks: Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
    /// Orders snapshot writes so an older snapshot never lands last.
    save_lock: Mutex<()>,
}

impl ChatOrchestrator {
    pub fn builder() -> ChatOrchestratorBuilder {
        ChatOrchestratorBuilder::default()
    }

    /// Tiers in the order they are tried. Always ends with a language model.
    pub fn tier_order(&self) -> &[ResponseTier] {
        &self.order
    }

    pub fn knowledge_enabled(&self) -> bool {
        self.knowledge_enabled.load(Ordering::Relaxed)
    }

    /// Takes effect from the next `send_message`.
    pub fn set_knowledge_enabled(&self, enabled: bool) {
        self.knowledge_enabled.store(enabled, Ordering::Relaxed);
        info!(enabled, "Knowledge augmentation toggled");
    }

    // ── Sessions ──

    /// Replace the in-memory sessions with the persisted ones. A failing
    /// backend leaves the store empty. Returns the number loaded.
    pub async fn load_sessions(&self) -> usize {
        let Some(persistence) = &self.persistence else {
            return 0;
        };

        match persistence.load().await {
            Ok(sessions) => {
                let count = sessions.len();
                let mut state = self.state.lock().await;
                let mut memory = ConversationMemory::new(self.context_window);
                for session in &sessions {
                    for message in &session.messages {
                        memory.push(&session.id, message.clone());
                    }
                }
                state.memory = memory;
                state.sessions.restore(sessions);
                info!(backend = persistence.name(), count, "Sessions loaded");
                count
            }
            Err(e) => {
                warn!(backend = persistence.name(), error = %e, "Failed to load sessions, starting empty");
                0
            }
        }
    }

    pub async fn create_session(&self, title: Option<&str>) -> Session {
        let session = self.state.lock().await.sessions.create(title);
        debug!(session_id = %session.id, title = %session.title, "Session created");
        self.save().await;
        session
    }

    pub async fn get_session(&self, id: &SessionId) -> Option<Session> {
        self.state.lock().await.sessions.get(id).cloned()
    }

    /// Most recently active first.
    pub async fn list_sessions(&self) -> Vec<Session> {
        self.state.lock().await.sessions.snapshot()
    }

    /// Remove a session together with its conversation memory.
    pub async fn delete_session(&self, id: &SessionId) -> bool {
        let removed = {
            let mut state = self.state.lock().await;
            state.memory.clear(id);
            state.sessions.delete(id)
        };
        self.session_locks.lock().await.remove(id);

        if removed {
            info!(session_id = %id, "Session deleted");
            self.save().await;
        }
        removed
    }

    pub async fn clear_memory(&self, id: &SessionId) -> bool {
        self.state.lock().await.memory.clear(id)
    }

    /// The bounded context the language model sees for this session.
    pub async fn context_window(&self, id: &SessionId) -> Vec<Message> {
        self.state.lock().await.memory.context(id)
    }

    // ── Turns ──

    /// Answer one user message and record the exchange.
    ///
    /// Only an unknown session is an error. Every other failure still
    /// produces an assistant message and commits the exchange.
    pub async fn send_message(&self, request: SendRequest) -> Result<Message> {
        let SendRequest {
            session_id,
            content,
            attachments,
            search_web,
        } = request;

        if !self.state.lock().await.sessions.contains(&session_id) {
            return Err(SessionError::NotFound(session_id).into());
        }

        let turn_lock = Arc::clone(
            self.session_locks
                .lock()
                .await
                .entry(session_id.clone())
                .or_default(),
        );
        let _turn = turn_lock.lock().await;

        // The session may have been deleted while this turn waited.
        let context = {
            let state = self.state.lock().await;
            state
                .sessions
                .contains(&session_id)
                .then(|| state.memory.context(&session_id))
        };
        let Some(context) = context else {
            self.session_locks.lock().await.remove(&session_id);
            return Err(SessionError::NotFound(session_id).into());
        };

        let text = content.trim();
        let files_only = text.is_empty() && !attachments.is_empty();
        let user_message = match attachments.first() {
            None => Message::user(text),
            Some(first) => {
                let kind = if attachments.iter().all(Attachment::is_image) {
                    MessageKind::Image
                } else {
                    MessageKind::File
                };
                let content = if files_only {
                    attachments::upload_notice(attachments.len())
                } else {
                    text.to_string()
                };
                Message::user(content)
                    .with_kind(kind)
                    .with_attachment(first.meta())
            }
        };
        let prompt = if files_only { FILES_ONLY_PROMPT } else { text };

        info!(
            session_id = %session_id,
            attachments = attachments.len(),
            search_web,
            "Processing message"
        );

        let mut reply = self.generate(&session_id, prompt, &context, search_web).await;
        if let Some(section) = attachments::summary(&attachments) {
            reply.text.push_str(&section);
        }

        let assistant_message = Message::assistant(reply.text).with_kind(reply.kind);
        {
            let mut state = self.state.lock().await;
            let ChatState { sessions, memory } = &mut *state;
            sessions.append_exchange(
                &session_id,
                user_message.clone(),
                assistant_message.clone(),
            )?;
            memory.append(&session_id, user_message.clone(), assistant_message.clone());
        }
        self.save().await;

        if reply.tier.is_some() {
            self.remember_exchange(&session_id, &user_message.content, &assistant_message.content);
        }

        debug!(
            session_id = %session_id,
            tier = ?reply.tier,
            chars = assistant_message.content.len(),
            "Exchange committed"
        );
        Ok(assistant_message)
    }

    async fn generate(
        &self,
        session_id: &SessionId,
        prompt: &str,
        context: &[Message],
        search_web: bool,
    ) -> Reply {
        let primary = AssertUnwindSafe(self.primary_reply(session_id, prompt, context))
            .catch_unwind()
            .await;

        let mut reply = match primary {
            Ok(Some((text, tier))) => Reply {
                text,
                kind: MessageKind::Text,
                tier: Some(tier),
            },
            Ok(None) => {
                warn!(session_id = %session_id, "No backend produced a reply");
                Reply::apology()
            }
            Err(_) => {
                error!(session_id = %session_id, "Reply generation panicked");
                Reply::apology()
            }
        };

        if search_web {
            let section = AssertUnwindSafe(self.search_section(prompt))
                .catch_unwind()
                .await
                .ok()
                .flatten();
            if let Some(section) = section {
                reply.text.push_str(&section);
                reply.kind = MessageKind::Search;
            }
        }
        reply
    }

    /// Walk the tiers in order. The first one with text wins.
    async fn primary_reply(
        &self,
        session_id: &SessionId,
        prompt: &str,
        context: &[Message],
    ) -> Option<(String, ResponseTier)> {
        for tier in &self.order {
            let text = match tier {
                ResponseTier::Prediction => self.predictor.as_ref().and_then(|predictor| {
                    predictor
                        .matches(prompt)
                        .then(|| predictor.respond(prompt))
                }),
                ResponseTier::Knowledge => self.knowledge_reply(session_id, prompt).await,
                ResponseTier::LanguageModel => {
                    Some(self.language_model.generate(prompt, context).await)
                }
            };

            match text {
                Some(text) if !text.trim().is_empty() => {
                    debug!(session_id = %session_id, tier = %tier, "Reply produced");
                    return Some((text, *tier));
                }
                Some(_) => warn!(tier = %tier, "Backend returned empty text, falling back"),
                None => {}
            }
        }
        None
    }

    async fn knowledge_reply(&self, session_id: &SessionId, prompt: &str) -> Option<String> {
        if !self.knowledge_enabled() {
            return None;
        }
        let knowledge = self.knowledge.as_ref()?;
        self.bounded(
            "enhanced_response",
            knowledge.enhanced_response(prompt, session_id, self.use_augmentation),
        )
        .await
    }

    async fn search_section(&self, query: &str) -> Option<String> {
        if !self.knowledge_enabled() {
            debug!("Web search requested without knowledge service, skipping");
            return None;
        }
        let knowledge = self.knowledge.as_ref()?;
        let snippets = self
            .bounded("search", knowledge.search(query, self.search_k))
            .await?;
        if snippets.is_empty() {
            return None;
        }

        let mut section = String::from("\n\n**🌐 Search Results:**\n");
        for (i, snippet) in snippets.iter().enumerate() {
            section.push_str(&format!("{}. {}\n", i + 1, snippet));
        }
        Some(section)
    }

    /// Run a knowledge call under the configured timeout. Failures are
    /// logged and become `None`.
    async fn bounded<T>(
        &self,
        operation: &str,
        call: impl Future<Output = std::result::Result<T, BackendError>>,
    ) -> Option<T> {
        match tokio::time::timeout(self.knowledge_timeout, call).await {
            Ok(Ok(value)) => Some(value),
            Ok(Err(e)) => {
                warn!(operation, error = %e, "Knowledge backend failed, falling back");
                None
            }
            Err(_) => {
                warn!(
                    operation,
                    timeout_secs = self.knowledge_timeout.as_secs_f64(),
                    "Knowledge backend timed out, falling back"
                );
                None
            }
        }
    }

    /// Hand the exchange to the knowledge service without waiting for it.
    fn remember_exchange(&self, session_id: &SessionId, user: &str, assistant: &str) {
        if !self.knowledge_enabled() {
            return;
        }
        let Some(knowledge) = &self.knowledge else {
            return;
        };

        let knowledge = Arc::clone(knowledge);
        let session_id = session_id.clone();
        let user = user.to_string();
        let assistant = assistant.to_string();
        let timeout = self.knowledge_timeout;
        tokio::spawn(async move {
            let call = knowledge.store_conversation(&user, &assistant, &session_id);
            match tokio::time::timeout(timeout, call).await {
                Ok(Ok(())) => debug!(session_id = %session_id, "Exchange stored"),
                Ok(Err(e)) => warn!(session_id = %session_id, error = %e, "Failed to store exchange"),
                Err(_) => warn!(session_id = %session_id, "Storing exchange timed out"),
            }
        });
    }

    async fn save(&self) {
        let Some(persistence) = &self.persistence else {
            return;
        };
        let _ordered = self.save_lock.lock().await;
        let snapshot = self.state.lock().await.sessions.snapshot();
        if let Err(e) = persistence.save(&snapshot).await {
            warn!(backend = persistence.name(), error = %e, "Failed to save sessions");
        }
    }
}
