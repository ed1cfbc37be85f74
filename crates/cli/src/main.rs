//! parley CLI: the main entry point.
//!
//! Commands:
//! - `onboard`: Initialize config directory
//! - `chat`: Interactive chat or single-message mode
//! - `sessions`: List, show, or delete saved conversations
//! - `predict`: Football predictions straight from the engine
//! - `doctor`: Diagnose configuration and backend health

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod runtime;

#[derive(Parser)]
#[command(
    name = "parley",
    about = "parley — conversational assistant with a layered reply fallback chain",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Onboard,

    /// Chat with the assistant
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Continue an existing session
        #[arg(short, long)]
        session: Option<String>,

        /// Append knowledge-service search results to replies
        #[arg(long)]
        search: bool,

        /// Attach a file (repeatable)
        #[arg(short, long = "attach")]
        attach: Vec<PathBuf>,

        /// API key to verify and use for this run
        #[arg(long, env = "PARLEY_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Personality, e.g. `teacher` or `coding_assistant`
        #[arg(short, long)]
        personality: Option<String>,

        /// Force offline demo replies
        #[arg(long)]
        demo: bool,
    },

    /// Manage saved sessions
    Sessions {
        #[command(subcommand)]
        action: SessionAction,
    },

    /// Football predictions
    Predict {
        /// Seed the engine for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Home club for a single match prediction
        #[arg(long, requires = "away")]
        home: Option<String>,

        /// Away club for a single match prediction
        #[arg(long, requires = "home")]
        away: Option<String>,

        /// League for a match prediction or standings table
        #[arg(long)]
        league: Option<String>,

        /// Show a standings table
        #[arg(long, conflicts_with = "upcoming")]
        standings: bool,

        /// Show fixtures for the next seven days
        #[arg(long)]
        upcoming: bool,

        /// Print JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Diagnose system health
    Doctor,
}

#[derive(Subcommand)]
enum SessionAction {
    /// List sessions, most recently active first
    List,
    /// Print a session transcript
    Show { id: String },
    /// Delete a session
    Delete { id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Chat {
            message,
            session,
            search,
            attach,
            api_key,
            personality,
            demo,
        } => {
            commands::chat::run(commands::chat::ChatOptions {
                message,
                session,
                search,
                attach,
                api_key,
                personality,
                demo,
            })
            .await?
        }
        Commands::Sessions { action } => match action {
            SessionAction::List => commands::sessions::list().await?,
            SessionAction::Show { id } => commands::sessions::show(&id).await?,
            SessionAction::Delete { id } => commands::sessions::delete(&id).await?,
        },
        Commands::Predict {
            seed,
            home,
            away,
            league,
            standings,
            upcoming,
            json,
        } => commands::predict::run(commands::predict::PredictOptions {
            seed,
            matchup: home.zip(away),
            league,
            standings,
            upcoming,
            json,
        })?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
