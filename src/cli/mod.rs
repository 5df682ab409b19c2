//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod plan;
mod render;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::models::{ProfileHeader, Snapshot};

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Statcard - Render end-game statistics snapshots into shareable cards
#[derive(Parser)]
#[command(name = "statcard")]
#[command(about = "Statcard - Render end-game statistics snapshots into shareable cards")]
#[command(version)]
pub struct Cli {
    /// Log phase-level detail (repeat for trace output)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render a card from a request file
    Render {
        /// JSON request file: {"profile": ..., "snapshot": ...}
        input: PathBuf,

        /// Directory holding static assets and entity portraits
        #[arg(short, long)]
        assets: PathBuf,

        /// Output file or directory.
        /// If omitted: {input}_card.{ext}
        /// If directory (ends with /): dir/{input}_card.{ext}
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Config file (default: discover statcard.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Correlation id echoed in logs and errors
        #[arg(long, default_value = "cli")]
        id: String,
    },

    /// Print the canvas plan for a request as JSON
    Plan {
        /// JSON request file
        input: PathBuf,
    },
}

/// Input file consumed by every subcommand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderRequest {
    pub profile: ProfileHeader,
    pub snapshot: Snapshot,
}

/// Read and parse a request file, reporting problems on stderr.
pub(crate) fn read_request(path: &Path) -> Result<RenderRequest, ExitCode> {
    let contents = fs::read_to_string(path).map_err(|e| {
        eprintln!("Error: Cannot open input file '{}': {}", path.display(), e);
        ExitCode::from(EXIT_INVALID_ARGS)
    })?;
    serde_json::from_str(&contents).map_err(|e| {
        eprintln!("Error: Invalid request '{}': {}", path.display(), e);
        ExitCode::from(EXIT_INVALID_ARGS)
    })
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    // A subscriber may already be installed when embedded; keep it
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Run the CLI application
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Render {
            input,
            assets,
            output,
            config,
            id,
        } => render::run_render(&input, &assets, output.as_deref(), config.as_deref(), &id),
        Commands::Plan { input } => plan::run_plan(&input),
    }
}
