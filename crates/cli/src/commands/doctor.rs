//! `parley doctor`: Diagnose configuration and backend health.

use parley_config::{AppConfig, StorageBackend};
use parley_core::KnowledgeSource;
use parley_knowledge::KnowledgeClient;
use parley_providers::LanguageModelBackend;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 parley Doctor — System Diagnostics");
    println!("====================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    let config = if config_path.exists() {
        match AppConfig::load() {
            Ok(config) => {
                println!("  ✅ Config file valid");
                config
            }
            Err(e) => {
                println!("  ❌ Config file invalid: {e}");
                println!("\n  ⚠️  Fix the config before running further checks.");
                return Ok(());
            }
        }
    } else {
        println!("  ⚠️  No config file — run `parley onboard` (using defaults)");
        issues += 1;
        AppConfig::default()
    };

    // Language model
    match &config.api_key {
        Some(key) => {
            let backend = LanguageModelBackend::new(config.backend_config());
            if backend.verify_api_key(key).await {
                println!("  ✅ API key accepted by {}", config.api_url);
            } else {
                println!("  ❌ API key rejected by {}", config.api_url);
                issues += 1;
            }
        }
        None => println!("  ⚠️  No API key — replies come from demo mode"),
    }
    if config.demo_mode_enabled() && config.has_api_key() {
        println!("  ⚠️  demo_mode is forced on; the API key is unused");
    }

    // Knowledge service
    if config.knowledge.enabled {
        match KnowledgeClient::from_config(&config.knowledge) {
            Ok(client) => match client.search("health check", 1).await {
                Ok(_) => println!("  ✅ Knowledge service reachable at {}", config.knowledge.api_url),
                Err(e) => {
                    println!("  ❌ Knowledge service unavailable: {e}");
                    issues += 1;
                }
            },
            Err(e) => {
                println!("  ❌ Knowledge client: {e}");
                issues += 1;
            }
        }
    } else {
        println!("  ✅ Knowledge service disabled");
    }

    // Storage
    match config.storage.backend {
        StorageBackend::File => {
            let dir = config.storage.resolved_dir();
            if dir.exists() {
                println!("  ✅ Session directory exists: {}", dir.display());
            } else {
                println!("  ⚠️  No session directory yet: {} (created on first save)", dir.display());
            }
        }
        StorageBackend::None => println!("  ⚠️  Session persistence disabled"),
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
