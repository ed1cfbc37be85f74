//! `parley chat`: Interactive chat or single-message mode.

use crate::runtime::{self, Runtime};
use parley_agent::SendRequest;
use parley_config::BackendConfigUpdate;
use parley_core::{Attachment, Personality, SessionId};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};

pub struct ChatOptions {
    pub message: Option<String>,
    pub session: Option<String>,
    pub search: bool,
    pub attach: Vec<PathBuf>,
    pub api_key: Option<String>,
    pub personality: Option<String>,
    pub demo: bool,
}

pub async fn run(options: ChatOptions) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = runtime::start().await?;
    configure_backend(&runtime, &options).await?;

    let attachments = options
        .attach
        .iter()
        .map(|p| attachment_from_path(p))
        .collect::<Result<Vec<_>, _>>()?;

    let mut session_id = match &options.session {
        Some(id) => {
            let id = SessionId::from(id.as_str());
            if runtime.orchestrator.get_session(&id).await.is_none() {
                return Err(format!("Unknown session: {id}").into());
            }
            id
        }
        None => runtime.orchestrator.create_session(None).await.id,
    };

    if let Some(msg) = options.message {
        let request = SendRequest::new(session_id, msg)
            .with_attachments(attachments)
            .with_web_search(options.search);
        let reply = runtime.orchestrator.send_message(request).await?;
        println!("{}", reply.content);
        return Ok(());
    }

    let name = runtime.config.assistant.name.clone();
    println!("💬 parley — {name} ({} mode)", runtime.language_model.mode());
    println!("   Session: {session_id}");
    println!("   Type 'exit' or 'quit' to leave. '/help' lists commands.\n");

    let mut search = options.search;
    let mut pending = attachments;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        match input {
            "" => continue,
            "exit" | "quit" | "/exit" | "/quit" => break,
            "/help" => {
                println!("  /new      start a new session");
                println!("  /clear    forget the context of this session");
                println!("  /search   toggle knowledge search results ({})", on_off(search));
                println!("  /prompts  suggestions for the current personality");
                println!("  /attach <path>  attach a file to the next message\n");
                continue;
            }
            "/new" => {
                session_id = runtime.orchestrator.create_session(None).await.id;
                println!("✨ New session: {session_id}\n");
                continue;
            }
            "/clear" => {
                runtime.orchestrator.clear_memory(&session_id).await;
                println!("🧹 Context cleared\n");
                continue;
            }
            "/search" => {
                search = !search;
                println!("🌐 Search results {}\n", on_off(search));
                continue;
            }
            "/prompts" => {
                for prompt in runtime.language_model.config().personality.starter_prompts() {
                    println!("  • {prompt}");
                }
                println!();
                continue;
            }
            _ => {}
        }

        if let Some(path) = input.strip_prefix("/attach ") {
            match attachment_from_path(Path::new(path.trim())) {
                Ok(attachment) => {
                    println!("📎 Attached {}\n", attachment.name);
                    pending.push(attachment);
                }
                Err(e) => println!("❌ {e}\n"),
            }
            continue;
        }

        let request = SendRequest::new(session_id.clone(), input)
            .with_attachments(std::mem::take(&mut pending))
            .with_web_search(search);
        match runtime.orchestrator.send_message(request).await {
            Ok(reply) => println!("\n{name} > {}\n", reply.content),
            Err(e) => println!("\n❌ {e}\n"),
        }
    }

    println!("Goodbye! 👋");
    Ok(())
}

async fn configure_backend(
    runtime: &Runtime,
    options: &ChatOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(name) = &options.personality {
        let personality: Personality = name.parse().map_err(|e: String| {
            let known: Vec<&str> = Personality::ALL.iter().map(|p| p.as_str()).collect();
            format!("{e} (expected one of: {})", known.join(", "))
        })?;
        runtime.language_model.set_personality(personality);
    }

    if let Some(key) = &options.api_key {
        if runtime.language_model.verify_api_key(key).await {
            runtime
                .language_model
                .set_config(BackendConfigUpdate::api_key(key.clone()));
        } else {
            println!("⚠️  API key was rejected; staying in demo mode");
        }
    }

    if options.demo {
        runtime
            .language_model
            .set_config(BackendConfigUpdate::demo_mode(true));
    }

    Ok(())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

fn attachment_from_path(path: &Path) -> Result<Attachment, String> {
    let metadata =
        std::fs::metadata(path).map_err(|e| format!("Cannot read {}: {e}", path.display()))?;
    if !metadata.is_file() {
        return Err(format!("Not a file: {}", path.display()));
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Attachment::new(name, metadata.len(), guess_mime(path)))
}

fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}
