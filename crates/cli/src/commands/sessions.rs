//! `parley sessions`: Inspect and prune saved conversations.

use crate::runtime;
use parley_core::{Role, SessionId};

pub async fn list() -> Result<(), Box<dyn std::error::Error>> {
    let runtime = runtime::start().await?;
    let sessions = runtime.orchestrator.list_sessions().await;

    if sessions.is_empty() {
        println!("No saved sessions. Start one with `parley chat`.");
        return Ok(());
    }

    println!("🗂️  Sessions ({})\n", sessions.len());
    for session in sessions {
        println!(
            "  {}  {:<24} {:>3} messages  updated {}",
            session.id,
            session.title,
            session.messages.len(),
            session.updated_at.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}

pub async fn show(id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = runtime::start().await?;
    let session = runtime
        .orchestrator
        .get_session(&SessionId::from(id))
        .await
        .ok_or_else(|| format!("Unknown session: {id}"))?;

    println!("📜 {} ({})\n", session.title, session.id);
    for message in &session.messages {
        let speaker = match message.role {
            Role::User => "You",
            _ => runtime.config.assistant.name.as_str(),
        };
        println!(
            "[{}] {speaker} > {}\n",
            message.timestamp.format("%H:%M:%S"),
            message.content
        );
    }
    Ok(())
}

pub async fn delete(id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let runtime = runtime::start().await?;
    if runtime.orchestrator.delete_session(&SessionId::from(id)).await {
        println!("✅ Deleted session {id}");
        Ok(())
    } else {
        Err(format!("Unknown session: {id}").into())
    }
}
