//! Lantern CLI - plan a turn or inspect site scores from a world snapshot.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

/// Lantern - flow-based routing for a grid settlement bot
#[derive(Parser, Debug)]
#[command(name = "lantern")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Plan one turn from a snapshot
    Plan {
        /// World snapshot (JSON)
        #[arg(required = true)]
        snapshot: PathBuf,

        /// Tuning overrides (JSON)
        #[arg(long)]
        tuning: Option<PathBuf>,

        /// Colonizer registry carried across turns (created if missing)
        #[arg(long)]
        state: Option<PathBuf>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },

    /// Rank candidate city sites
    Survey {
        /// World snapshot (JSON)
        #[arg(required = true)]
        snapshot: PathBuf,

        /// Tuning overrides (JSON)
        #[arg(long)]
        tuning: Option<PathBuf>,

        /// Number of sites to list (default: tuning's candidate count)
        #[arg(short, long)]
        top: Option<usize>,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Logs go to stderr so they never mix with the plan on stdout
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match args.command {
        Commands::Plan {
            snapshot,
            tuning,
            state,
            format,
        } => cli::plan::execute(&snapshot, tuning.as_deref(), state.as_deref(), format),

        Commands::Survey {
            snapshot,
            tuning,
            top,
            format,
        } => cli::survey::execute(&snapshot, tuning.as_deref(), top, format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
