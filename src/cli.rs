//! CLI interface using clap
//!
//! `serve` runs the HTTP API; `render` and `versions` work offline
//! against the same annotations and captures.

use crate::config::Settings;
use crate::state::AppState;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// SchemaDoc - versioned schema documentation
#[derive(Parser, Debug)]
#[command(name = "schemadoc")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Settings file (defaults to ./schemadoc.toml when present)
    #[arg(short, long, global = true, env = "SCHEMADOC_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP API
    Serve,

    /// Write the JSON report for a version range
    Render(RenderArgs),

    /// List known versions and the capture each one uses
    Versions,
}

#[derive(Parser, Debug)]
pub struct RenderArgs {
    /// First version of the range (defaults from the annotations)
    #[arg(long)]
    pub from: Option<String>,

    /// Last version of the range (defaults from the annotations)
    #[arg(long)]
    pub to: Option<String>,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Build the report and write it as pretty JSON. Incomplete annotations
/// fail the command with every diagnostic in the error.
pub fn render(settings: &Settings, args: &RenderArgs) -> Result<()> {
    let state = AppState::load(settings).context("failed to load schema data")?;
    let (default_first, default_last) = state
        .annotations
        .default_range()
        .context("no versions are configured")?;
    let first = args.from.clone().unwrap_or_else(|| default_first.to_string());
    let last = args.to.clone().unwrap_or_else(|| default_last.to_string());

    let report = state.engine().generate(&first, &last)?;
    let json = serde_json::to_string_pretty(&report)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, json + "\n")
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("Wrote schema of {} to {}", report.version_phrase(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{}", json)?;
        }
    }
    Ok(())
}

/// Print `version -> capture`, one per line
pub fn versions(settings: &Settings) -> Result<()> {
    let state = AppState::load(settings).context("failed to load schema data")?;
    let mut stdout = std::io::stdout().lock();
    for version in &state.annotations.version_order {
        let schema = state.annotations.schema_for(version).unwrap_or("-");
        let loaded = if state.snapshots.contains(schema) { "" } else { " (not loaded)" };
        writeln!(stdout, "{:<12} {}{}", version, schema, loaded)?;
    }
    Ok(())
}
