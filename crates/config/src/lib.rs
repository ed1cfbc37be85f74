//! Configuration loading, validation, and management for parley.
//!
//! Loads configuration from `~/.parley/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use parley_core::{Personality, ResponseTier};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.parley/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the OpenAI-compatible backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible backend
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Model and generation settings
    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Conversation memory settings
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Knowledge (retrieval-augmented) service
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Reply fallback chain
    #[serde(default)]
    pub routing: RoutingConfig,

    /// Session persistence
    #[serde(default)]
    pub storage: StorageConfig,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_true() -> bool {
    true
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("assistant", &self.assistant)
            .field("memory", &self.memory)
            .field("knowledge", &self.knowledge)
            .field("routing", &self.routing)
            .field("storage", &self.storage)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default = "default_model")]
    pub name: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_penalty")]
    pub presence_penalty: f32,

    #[serde(default = "default_penalty")]
    pub frequency_penalty: f32,

    /// Upper bound on one live request
    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,

    /// Offline replies only. Unset means "on unless an API key is present".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demo_mode: Option<bool>,
}

fn default_model() -> String {
    "gpt-3.5-turbo".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1000
}
fn default_penalty() -> f32 {
    0.1
}
fn default_request_timeout() -> u64 {
    10
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            presence_penalty: default_penalty(),
            frequency_penalty: default_penalty(),
            timeout_secs: default_request_timeout(),
            demo_mode: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Name the assistant introduces itself with
    #[serde(default = "default_assistant_name")]
    pub name: String,

    #[serde(default)]
    pub personality: Personality,
}

fn default_assistant_name() -> String {
    "Parley".into()
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            name: default_assistant_name(),
            personality: Personality::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Messages kept per session for prompt context
    #[serde(default = "default_context_window")]
    pub context_window_size: usize,
}

fn default_context_window() -> usize {
    10
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            context_window_size: default_context_window(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_knowledge_url")]
    pub api_url: String,

    #[serde(default = "default_user_id")]
    pub user_id: String,

    /// Snippets requested for web-search augmentation
    #[serde(default = "default_search_k")]
    pub search_k: usize,

    /// Ask the service to augment replies with retrieved context
    #[serde(default = "default_true")]
    pub use_augmentation: bool,

    #[serde(default = "default_request_timeout")]
    pub timeout_secs: u64,
}

fn default_knowledge_url() -> String {
    "http://localhost:8000".into()
}
fn default_user_id() -> String {
    "default-user".into()
}
fn default_search_k() -> usize {
    5
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_url: default_knowledge_url(),
            user_id: default_user_id(),
            search_k: default_search_k(),
            use_augmentation: true,
            timeout_secs: default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingConfig {
    /// Tiers tried in order. The language model always closes the chain.
    #[serde(default = "ResponseTier::default_order")]
    pub order: Vec<ResponseTier>,

    /// Answer football prediction requests locally
    #[serde(default = "default_true")]
    pub predictions_enabled: bool,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            order: ResponseTier::default_order(),
            predictions_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Storage identifier the session snapshot is saved under
    #[serde(default = "default_storage_key")]
    pub key: String,

    /// Directory for the file backend; defaults to `~/.parley/sessions`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

fn default_storage_key() -> String {
    "chat-sessions".into()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::File,
            key: default_storage_key(),
            dir: None,
        }
    }
}

impl StorageConfig {
    pub fn resolved_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| AppConfig::config_dir().join("sessions"))
    }
}

/// The settings the language model backend reads on every call.
#[derive(Clone, PartialEq)]
pub struct BackendConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub presence_penalty: f32,
    pub frequency_penalty: f32,
    pub timeout_secs: u64,
    pub demo_mode_enabled: bool,
    pub personality: Personality,
    pub assistant_name: String,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("demo_mode_enabled", &self.demo_mode_enabled)
            .field("personality", &self.personality)
            .finish()
    }
}

/// A partial change to [`BackendConfig`]. Absent fields keep their value.
#[derive(Clone, Default)]
pub struct BackendConfigUpdate {
    /// An empty string clears the stored key.
    pub api_key: Option<String>,
    pub demo_mode_enabled: Option<bool>,
    pub base_url: Option<String>,
    pub personality: Option<Personality>,
}

impl BackendConfigUpdate {
    pub fn api_key(key: impl Into<String>) -> Self {
        Self {
            api_key: Some(key.into()),
            ..Self::default()
        }
    }

    pub fn demo_mode(enabled: bool) -> Self {
        Self {
            demo_mode_enabled: Some(enabled),
            ..Self::default()
        }
    }
}

impl BackendConfig {
    /// Apply a partial update.
    ///
    /// When the key or the demo flag is touched, the demo flag becomes the
    /// supplied value, or `true` exactly when no key is stored.
    pub fn apply(&mut self, update: BackendConfigUpdate) {
        let touches_mode = update.api_key.is_some() || update.demo_mode_enabled.is_some();

        if let Some(key) = update.api_key {
            let key = key.trim().to_string();
            self.api_key = (!key.is_empty()).then_some(key);
        }
        if let Some(url) = update.base_url {
            self.base_url = url;
        }
        if let Some(personality) = update.personality {
            self.personality = personality;
        }
        if touches_mode {
            self.demo_mode_enabled = update
                .demo_mode_enabled
                .unwrap_or(self.api_key.is_none());
        }
    }

    /// Whether a live request should be attempted.
    pub fn live_enabled(&self) -> bool {
        !self.demo_mode_enabled && self.api_key.is_some()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.parley/config.toml),
    /// then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|name| std::env::var(name).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides using `lookup` to read variables.
    ///
    /// - `PARLEY_API_KEY`, then `OPENAI_API_KEY` (only when no key is configured)
    /// - `PARLEY_API_URL`, then `OPENAI_API_URL`
    /// - `PARLEY_MODEL`, `PARLEY_DEMO_MODE`, `PARLEY_ENABLE_KNOWLEDGE`,
    ///   `PARLEY_KNOWLEDGE_URL`, `PARLEY_USER_ID`
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if self.api_key.is_none() {
            self.api_key = non_empty("PARLEY_API_KEY").or_else(|| non_empty("OPENAI_API_KEY"));
        }
        if let Some(url) = non_empty("PARLEY_API_URL").or_else(|| non_empty("OPENAI_API_URL")) {
            self.api_url = url;
        }
        if let Some(model) = non_empty("PARLEY_MODEL") {
            self.model.name = model;
        }
        if let Some(flag) = non_empty("PARLEY_DEMO_MODE") {
            match parse_flag(&flag) {
                Some(v) => self.model.demo_mode = Some(v),
                None => tracing::warn!(value = %flag, "Ignoring unrecognised PARLEY_DEMO_MODE"),
            }
        }
        if let Some(flag) = non_empty("PARLEY_ENABLE_KNOWLEDGE") {
            match parse_flag(&flag) {
                Some(v) => self.knowledge.enabled = v,
                None => {
                    tracing::warn!(value = %flag, "Ignoring unrecognised PARLEY_ENABLE_KNOWLEDGE")
                }
            }
        }
        if let Some(url) = non_empty("PARLEY_KNOWLEDGE_URL") {
            self.knowledge.api_url = url;
        }
        if let Some(user) = non_empty("PARLEY_USER_ID") {
            self.knowledge.user_id = user;
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".parley")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(ConfigError::ValidationError(
                "model.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        for (name, value) in [
            ("presence_penalty", self.model.presence_penalty),
            ("frequency_penalty", self.model.frequency_penalty),
        ] {
            if !(-2.0..=2.0).contains(&value) {
                return Err(ConfigError::ValidationError(format!(
                    "model.{name} must be between -2.0 and 2.0"
                )));
            }
        }
        if self.model.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "model.max_tokens must be > 0".into(),
            ));
        }
        if self.model.timeout_secs == 0 || self.knowledge.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeouts must be > 0 seconds".into(),
            ));
        }
        if self.memory.context_window_size == 0 {
            return Err(ConfigError::ValidationError(
                "memory.context_window_size must be >= 1".into(),
            ));
        }
        if self.knowledge.enabled && self.knowledge.api_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "knowledge.api_url is required when knowledge is enabled".into(),
            ));
        }
        if self.storage.key.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "storage.key must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// The demo flag as the backend sees it.
    pub fn demo_mode_enabled(&self) -> bool {
        self.model.demo_mode.unwrap_or(self.api_key.is_none())
    }

    /// Snapshot of the settings the language model backend needs.
    pub fn backend_config(&self) -> BackendConfig {
        BackendConfig {
            api_key: self.api_key.clone(),
            base_url: self.api_url.clone(),
            model: self.model.name.clone(),
            temperature: self.model.temperature,
            max_tokens: self.model.max_tokens,
            presence_penalty: self.model.presence_penalty,
            frequency_penalty: self.model.frequency_penalty,
            timeout_secs: self.model.timeout_secs,
            demo_mode_enabled: self.demo_mode_enabled(),
            personality: self.assistant.personality,
            assistant_name: self.assistant.name.clone(),
        }
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            model: ModelConfig::default(),
            assistant: AssistantConfig::default(),
            memory: MemoryConfig::default(),
            knowledge: KnowledgeConfig::default(),
            routing: RoutingConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
