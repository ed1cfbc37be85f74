//! Language model backend: live completion with an offline fallback.
//!
//! Every call reads the current [`BackendConfig`]. When a key is present and
//! demo mode is off, the OpenAI-compatible endpoint is tried under a timeout;
//! any failure falls through to the [`HeuristicResponder`]. `generate` always
//! returns text.

use async_trait::async_trait;
use parley_config::{BackendConfig, BackendConfigUpdate};
use parley_core::{BackendError, LanguageModel, Message, Personality};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::heuristic::HeuristicResponder;
use crate::openai_compat::{ApiMessage, ChatRequest, OpenAiCompatClient};

pub struct LanguageModelBackend {
    config: RwLock<BackendConfig>,
}

impl LanguageModelBackend {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }

    /// Apply a partial configuration change. Takes effect on the next call.
    pub fn set_config(&self, update: BackendConfigUpdate) {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        config.apply(update);
        info!(
            has_api_key = config.api_key.is_some(),
            demo_mode = config.demo_mode_enabled,
            "Language model configuration updated"
        );
    }

    pub fn set_personality(&self, personality: Personality) {
        self.set_config(BackendConfigUpdate {
            personality: Some(personality),
            ..BackendConfigUpdate::default()
        });
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> BackendConfig {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// "live" or "demo", as the next call would run.
    pub fn mode(&self) -> &'static str {
        if self.config().live_enabled() {
            "live"
        } else {
            "demo"
        }
    }

    /// System instruction followed by one user turn holding the flattened
    /// context and the current input.
    pub fn build_prompt(config: &BackendConfig, input: &str, context: &[Message]) -> Vec<ApiMessage> {
        let system = format!(
            "You are {}, a helpful and intelligent AI assistant. {}",
            config.assistant_name,
            config.personality.system_hint()
        );

        let mut user = String::new();
        if !context.is_empty() {
            user.push_str("Conversation so far:\n");
            for message in context {
                user.push_str(message.role.label());
                user.push_str(": ");
                user.push_str(&message.content);
                user.push('\n');
            }
            user.push_str("\nUser: ");
        }
        user.push_str(input);

        vec![ApiMessage::system(system), ApiMessage::user(user)]
    }

    /// Probe `key` against the configured endpoint (`GET /models`).
    pub async fn verify_api_key(&self, key: &str) -> bool {
        let config = self.config();
        match OpenAiCompatClient::new(
            &config.base_url,
            key,
            Duration::from_secs(config.timeout_secs),
        ) {
            Ok(client) => client.verify_key().await,
            Err(e) => {
                warn!(error = %e, "Could not build client for key probe");
                false
            }
        }
    }

    async fn generate_live(
        config: &BackendConfig,
        input: &str,
        context: &[Message],
    ) -> Result<String, BackendError> {
        let key = config
            .api_key
            .as_deref()
            .ok_or_else(|| BackendError::NotConfigured("no API key".into()))?;
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = OpenAiCompatClient::new(&config.base_url, key, timeout)?;

        let request = ChatRequest {
            model: config.model.clone(),
            messages: Self::build_prompt(config, input, context),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            presence_penalty: config.presence_penalty,
            frequency_penalty: config.frequency_penalty,
        };

        match tokio::time::timeout(timeout, client.chat(&request)).await {
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout(format!(
                "live completion exceeded {}s",
                timeout.as_secs()
            ))),
        }
    }

    fn demo_reply(config: &BackendConfig, input: &str) -> String {
        HeuristicResponder::new(&config.assistant_name)
            .with_personality(config.personality)
            .respond(input)
            .text
    }
}

#[async_trait]
impl LanguageModel for LanguageModelBackend {
    fn name(&self) -> &str {
        "language_model"
    }

    async fn generate(&self, input: &str, context: &[Message]) -> String {
        let config = self.config();

        if config.live_enabled() {
            debug!(model = %config.model, context = context.len(), "Trying live completion");
            match Self::generate_live(&config, input, context).await {
                Ok(text) => return text,
                Err(e) => warn!(
                    error = %e,
                    "Live completion failed, falling back to demo reply"
                ),
            }
        }

        Self::demo_reply(&config, input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_config::AppConfig;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server_uri: &str, key: Option<&str>) -> BackendConfig {
        let mut config = AppConfig::default().backend_config();
        config.base_url = server_uri.to_string();
        config.timeout_secs = 2;
        config.apply(BackendConfigUpdate {
            api_key: Some(key.unwrap_or_default().to_string()),
            ..BackendConfigUpdate::default()
        });
        config
    }

    fn completion(text: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": text}}]
        }))
    }

    #[tokio::test]
    async fn live_reply_when_key_present() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(completion("from the model"))
            .expect(1)
            .mount(&server)
            .await;

        let backend = LanguageModelBackend::new(config_for(&server.uri(), Some("sk-test")));
        assert_eq!(backend.mode(), "live");
        assert_eq!(backend.generate("hello", &[]).await, "from the model");
    }

    #[tokio::test]
    async fn live_failure_falls_back_to_demo() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let backend = LanguageModelBackend::new(config_for(&server.uri(), Some("sk-test")));
        assert_eq!(backend.generate("12 * 4", &[]).await, "The result of 12 * 4 is 48");
    }

    #[tokio::test]
    async fn demo_mode_never_calls_the_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(completion("should not be used"))
            .expect(0)
            .mount(&server)
            .await;

        let backend = LanguageModelBackend::new(config_for(&server.uri(), Some("sk-test")));
        backend.set_config(BackendConfigUpdate::demo_mode(true));
        assert_eq!(backend.mode(), "demo");
        assert!(backend.generate("hello", &[]).await.starts_with("Hello!"));
    }

    #[tokio::test]
    async fn no_key_means_demo() {
        let backend = LanguageModelBackend::new(AppConfig::default().backend_config());
        assert_eq!(backend.mode(), "demo");
        let reply = backend.generate("What is 6 * 7?", &[]).await;
        assert!(reply.contains("42"));
    }

    #[tokio::test]
    async fn config_change_applies_to_next_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(completion("live now"))
            .mount(&server)
            .await;

        let backend = LanguageModelBackend::new(config_for(&server.uri(), None));
        assert_ne!(backend.generate("hi", &[]).await, "live now");

        backend.set_config(BackendConfigUpdate::api_key("sk-new"));
        assert_eq!(backend.generate("hi", &[]).await, "live now");
    }

    #[test]
    fn prompt_flattens_context_in_order() {
        let config = AppConfig::default().backend_config();
        let context = vec![Message::user("first"), Message::assistant("second")];
        let prompt = LanguageModelBackend::build_prompt(&config, "third", &context);

        assert_eq!(prompt.len(), 2);
        assert_eq!(prompt[0].role, "system");
        assert!(prompt[0].content.contains("Parley"));
        let user = &prompt[1].content;
        let first = user.find("User: first").unwrap();
        let second = user.find("Assistant: second").unwrap();
        let third = user.find("User: third").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn prompt_without_context_is_just_the_input() {
        let config = AppConfig::default().backend_config();
        let prompt = LanguageModelBackend::build_prompt(&config, "hello", &[]);
        assert_eq!(prompt[1].content, "hello");
    }

    #[tokio::test]
    async fn key_probe_uses_models_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/models"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"data": []})))
            .mount(&server)
            .await;

        let backend = LanguageModelBackend::new(config_for(&server.uri(), None));
        assert!(backend.verify_api_key("sk-probe").await);
    }
}
