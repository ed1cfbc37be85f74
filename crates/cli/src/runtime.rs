//! Wiring: turn an `AppConfig` into a ready chat orchestrator.

use parley_agent::ChatOrchestrator;
use parley_config::{AppConfig, StorageBackend, StorageConfig};
use parley_core::SessionPersistence;
use parley_knowledge::KnowledgeClient;
use parley_memory::{FileSessionStorage, NoopStorage};
use parley_predict::PredictionService;
use parley_providers::LanguageModelBackend;
use std::sync::Arc;
use tracing::debug;

pub struct Runtime {
    pub config: AppConfig,
    pub language_model: Arc<LanguageModelBackend>,
    pub orchestrator: ChatOrchestrator,
}

pub fn persistence(storage: &StorageConfig) -> Arc<dyn SessionPersistence> {
    match storage.backend {
        StorageBackend::File => Arc::new(FileSessionStorage::new(
            storage.resolved_dir(),
            &storage.key,
        )),
        StorageBackend::None => Arc::new(NoopStorage),
    }
}

/// Load config, build every backend, and restore saved sessions.
pub async fn start() -> Result<Runtime, Box<dyn std::error::Error>> {
    start_with(AppConfig::load()?).await
}

pub async fn start_with(config: AppConfig) -> Result<Runtime, Box<dyn std::error::Error>> {
    let language_model = Arc::new(LanguageModelBackend::new(config.backend_config()));
    // Built even when disabled so the flag can be flipped at runtime.
    let knowledge = KnowledgeClient::from_config(&config.knowledge)?;

    let orchestrator = ChatOrchestrator::builder()
        .config(&config)
        .language_model(language_model.clone())
        .knowledge(Arc::new(knowledge))
        .predictor(Arc::new(PredictionService::new()))
        .persistence(persistence(&config.storage))
        .build()?;

    let restored = orchestrator.load_sessions().await;
    debug!(
        restored,
        mode = language_model.mode(),
        "Runtime ready"
    );

    Ok(Runtime {
        config,
        language_model,
        orchestrator,
    })
}
