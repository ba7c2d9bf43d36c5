//! Command-line front end for the auto-zoom engine.
//!
//! Reads a recorded input session (JSONL event log) and engine settings
//! (JSON), then either dumps the built zoom timeline or samples render
//! parameters across the session at a chosen frame rate.

mod commands;
mod io;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use grabme_common::config::LoggingConfig;

#[derive(Parser)]
#[command(name = "engine-cli", version, about = "Auto-zoom engine CLI")]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a zoom timeline for a session and print it as JSON.
    Timeline {
        /// Path to a JSONL event log.
        #[arg(long)]
        events: PathBuf,

        /// Path to a JSON settings file; defaults are used if omitted.
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Session duration in seconds.
        #[arg(long)]
        duration: f64,

        /// Pretty-print the JSON output.
        #[arg(long)]
        pretty: bool,
    },

    /// Build a timeline and sample render parameters at a fixed frame rate.
    Sample {
        /// Path to a JSONL event log.
        #[arg(long)]
        events: PathBuf,

        /// Path to a JSON settings file; defaults are used if omitted.
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Session duration in seconds.
        #[arg(long)]
        duration: f64,

        /// Sampling rate in frames per second.
        #[arg(long, default_value_t = 30.0)]
        fps: f64,

        /// Pretty-print each JSON record.
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    grabme_common::logging::init_logging(&LoggingConfig {
        level: level.to_string(),
        json: false,
        file: None,
    });

    match cli.command {
        Commands::Timeline { events, settings, duration, pretty } => {
            commands::timeline::run(commands::timeline::Args { events, settings, duration, pretty })
        }
        Commands::Sample { events, settings, duration, fps, pretty } => {
            commands::sample::run(commands::sample::Args { events, settings, duration, fps, pretty })
        }
    }
}
