//! bancho-server - Bancho packet host
//!
//! Loads `config.json`, listens for game clients and logs every packet they
//! send.

use std::path::PathBuf;

use anyhow::Context;
use async_trait::async_trait;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use server::{load_or_init, EventHandler, EventManager, Server, ServerEvent};

/// bancho-server - Bancho packet host
#[derive(Parser)]
#[command(name = "bancho-server")]
#[command(version)]
#[command(
    about = "Host raw Bancho packet streams over TCP and log each packet",
    long_about = None
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Logs every event it receives.
struct LogHandler;

#[async_trait]
impl EventHandler<ServerEvent> for LogHandler {
    async fn handle(&self, event: &ServerEvent) {
        match event {
            ServerEvent::Connected { addr } => tracing::info!(%addr, "client connected"),
            ServerEvent::Packet { addr, frame } => match frame.kind() {
                Some(kind) => tracing::info!(%addr, %kind, len = frame.len(), "packet"),
                None => tracing::warn!(%addr, id = frame.id, len = frame.len(), "unknown packet"),
            },
            ServerEvent::Disconnected { addr, reason } => {
                tracing::info!(%addr, %reason, "client disconnected");
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let loaded = load_or_init(&cli.config)
        .with_context(|| format!("failed to load config {}", cli.config.display()))?;
    if loaded.was_updated() {
        tracing::info!(
            path = %cli.config.display(),
            "The config has just been updated! Please edit according to your preferences!"
        );
        return Ok(());
    }

    let mut events = EventManager::new();
    for name in [
        ServerEvent::CONNECTED,
        ServerEvent::PACKET,
        ServerEvent::DISCONNECTED,
    ] {
        events.register(name, LogHandler);
    }

    let server = Server::bind(loaded.config, events)
        .await
        .context("failed to start server")?;

    server
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    Ok(())
}
