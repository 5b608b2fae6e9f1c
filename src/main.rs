//! Arenachat - LLM battle arena client
//!
//! Main entry point for the arenachat application.

use anyhow::Result;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use arenachat::arena::ArenaClient;
use arenachat::chat_mode;
use arenachat::cli::{Cli, Commands};
use arenachat::commands;
use arenachat::config::Config;
use arenachat::session::{ReconciliationController, SessionStore};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse_args();

    // Mirror a CLI storage override into the environment so
    // `SessionStore::open` picks it up regardless of call path.
    if let Some(db_path) = &cli.storage_path {
        std::env::set_var("ARENACHAT_THREADS_DB", db_path);
        tracing::info!("Using thread DB override from CLI: {}", db_path);
    }

    let config = Config::load(&cli.config, cli.server.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Chat => {
            let store = SessionStore::open(config.storage.path.as_deref())?;
            let controller = ReconciliationController::new(
                store,
                Duration::from_millis(config.chat.pending_window_ms),
            );
            let client = ArenaClient::new(&config.server)?;
            chat_mode::run_chat(controller, &client, &config.chat).await?;
            Ok(())
        }
        Commands::Battles { command } => {
            let client = ArenaClient::new(&config.server)?;
            commands::battles::handle_battles(&client, command).await?;
            Ok(())
        }
        Commands::Stats { command } => {
            let client = ArenaClient::new(&config.server)?;
            commands::stats::handle_stats(&client, command).await?;
            Ok(())
        }
        Commands::Threads { command } => {
            let store = SessionStore::open(config.storage.path.as_deref())?;
            commands::threads::handle_threads(&store, command)?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("arenachat=warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
