//! SchemaDoc - versioned schema documentation
//!
//! Builds the history of a defect tracker's database schema across its
//! released versions: what each table, column and index looked like,
//! when it changed, and why, with every addition and removal explained
//! by curated annotations.
//!
//! PIPELINE: for a requested version range
//! - Normalize: raw `describe`/`show index` captures to canonical records
//! - Merge: per-field timelines across every distinct capture in range
//! - Classify: colour added/removed/changed objects and annotate them
//! - Compress: timelines to change points, rendered as display strings
//!
//! The result is served as JSON over HTTP or written by the CLI.

mod annotations;
mod cli;
mod config;
mod diagnostics;
mod error;
mod history;
mod report;
mod routes;
mod snapshot;
mod state;
mod version;

#[cfg(test)]
mod testutil;

use crate::cli::{Cli, Commands};
use crate::config::Settings;
use crate::routes::create_router;
use crate::state::AppState;
use anyhow::Context;
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber for structured logging
    init_tracing();

    let settings = Settings::load(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command {
        Commands::Serve => serve(settings).await,
        Commands::Render(args) => cli::render(&settings, &args),
        Commands::Versions => cli::versions(&settings),
    }
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    info!("🚀 Starting SchemaDoc...");

    let state = Arc::new(AppState::load(&settings).context("failed to load schema data")?);
    info!(
        "📋 {} versions, {} captures loaded",
        state.annotations.version_order.len(),
        state.snapshots.len()
    );

    let app = create_router(state, &settings);
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("🌐 Server listening on http://{}", addr);
    info!("📚 API Endpoints:");
    info!("   GET  /health                  - Liveness check");
    info!("   GET  /api/versions            - Known versions and release notes");
    info!("   GET  /api/snapshots           - Loaded schema captures");
    info!("   GET  /api/schema?from=&to=    - Schema report for a range");
    info!("   GET  /api/schema/{{version}}    - Schema report for one version");

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,schemadoc=debug,tower_http=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}
