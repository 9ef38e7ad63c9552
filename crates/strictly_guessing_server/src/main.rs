//! Strictly Guessing - Unified CLI
//!
//! Runs the HTTP server or a match in the terminal.

#![warn(missing_docs)]

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use strictly_guessing::{GuessingEngine, SeededRandom, SessionStore, SystemClock, ThreadRandom};
use strictly_guessing_server::{AppState, Cli, Command, InMemoryHistory, ServerConfig, router};
use tracing::{info, instrument, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { config, host, port } => run_http_server(config, host, port).await,
        Command::Play {
            player1,
            player2,
            seed,
        } => run_play(player1, player2, seed),
    }
}

/// Run the HTTP game server
async fn run_http_server(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
) -> Result<()> {
    let config = ServerConfig::load(config_path.as_deref())?.with_overrides(host, port)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_filter())),
        )
        .init();

    info!(?config, "Starting Strictly Guessing HTTP server");

    let engine = Arc::new(GuessingEngine::new());
    let history = Arc::new(InMemoryHistory::new(*config.history_limit()));
    info!(limit = history.limit(), "Completed games are kept in memory");
    let app = router(AppState::new(engine, history));

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    info!(address = %config.bind_address(), "Server ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

/// Run a match in this terminal
#[instrument]
fn run_play(player1: String, player2: String, seed: Option<u64>) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let engine = match seed {
        Some(seed) => GuessingEngine::with_parts(
            Arc::new(SessionStore::new()),
            Arc::new(SystemClock),
            Box::new(SeededRandom::new(seed)),
        ),
        None => GuessingEngine::with_parts(
            Arc::new(SessionStore::new()),
            Arc::new(SystemClock),
            Box::new(ThreadRandom),
        ),
    };

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    strictly_guessing_server::run_match(&engine, &player1, &player2, stdin.lock(), stdout.lock())?;
    Ok(())
}
