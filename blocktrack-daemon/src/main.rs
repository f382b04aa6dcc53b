//! blocktrack daemon - project tracking server for Scratch.
//!
//! A single binary that provides:
//! - HTTP API for registering projects and recording commits
//! - Snapshot rotation and `.sb3` archive extraction
//! - WebSocket notifications for a companion desktop client

use anyhow::Result;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

mod archive;
mod config;
mod git;
mod server;

use config::ProjectRegistry;
use server::{create_router, AppState};

/// blocktrack project tracking daemon
#[derive(Parser, Debug)]
#[command(name = "blocktrack-daemon")]
#[command(about = "Tracks Scratch projects in git and synthesizes commit messages")]
#[command(version)]
struct Cli {
    /// Directory holding the project workspaces and registry
    #[arg(default_value = "projects")]
    root: PathBuf,

    /// HTTP port to listen on
    #[arg(short, long, default_value = "6969")]
    port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .compact()
        .init();

    fs::create_dir_all(&cli.root)?;
    let root = cli.root.canonicalize().unwrap_or(cli.root.clone());

    info!("Starting blocktrack daemon for {:?}", root);

    let registry = ProjectRegistry::load(root.join("project_config.json"))?;
    let (events_tx, _) = broadcast::channel(64);

    let state = AppState {
        registry: Arc::new(RwLock::new(registry)),
        events_tx,
        workspaces_root: root,
    };

    let router = create_router(state);
    let addr = format!("0.0.0.0:{}", cli.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("blocktrack daemon listening on http://{}", addr);

    axum::serve(listener, router).await?;
    Ok(())
}
