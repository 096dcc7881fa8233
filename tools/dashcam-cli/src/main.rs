//! Dashcam CLI: record, inspect, validate, gate, and replay
//! interaction-session documents.
//!
//! Usage:
//!   dashcam record [OPTIONS]        Record a synthetic demo session
//!   dashcam inspect <FILE>          Analyze a session document
//!   dashcam validate <FILE>         Check a document parses as a session
//!   dashcam gate <FILE>             Show the delivery decision for a document
//!   dashcam replay <FILE>           Replay a document against in-memory surfaces

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod surfaces;

#[derive(Parser)]
#[command(
    name = "dashcam",
    about = "Interaction-session recording and replay toolkit",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a synthetic demo session to a document
    Record {
        /// Output file; a bare name lands in the configured sessions
        /// directory
        #[arg(short, long, default_value = "session.json")]
        output: PathBuf,

        /// Recording duration in seconds
        #[arg(long, default_value = "3.0")]
        duration_secs: f64,

        /// Number of synthetic drawing surfaces
        #[arg(long, default_value = "2")]
        surfaces: usize,

        /// Snapshot interval in milliseconds (config default: 1000)
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Snapshot quality factor [0.0, 1.0] (config default: 0.6)
        #[arg(long)]
        quality: Option<f64>,
    },

    /// Analyze the event structure of a session document
    Inspect {
        /// Path to the session document
        path: PathBuf,
    },

    /// Validate that a file is a well-formed session document
    Validate {
        /// Path to the session document
        path: PathBuf,
    },

    /// Show the transport delivery decision for a document
    Gate {
        /// Path to the session document
        path: PathBuf,

        /// Channel ceiling in bytes (overrides config and environment)
        #[arg(long)]
        ceiling: Option<usize>,
    },

    /// Replay a document against in-memory surfaces
    Replay {
        /// Path to the session document
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging from config; --verbose overrides the level.
    let mut log_config = dashcam_common::AppConfig::load().logging;
    if cli.verbose {
        log_config.level = "debug".to_string();
    }
    dashcam_common::logging::init_logging(&log_config);

    match cli.command {
        Commands::Record {
            output,
            duration_secs,
            surfaces,
            interval_ms,
            quality,
        } => commands::record::run(output, duration_secs, surfaces, interval_ms, quality).await,
        Commands::Inspect { path } => commands::inspect::run(path),
        Commands::Validate { path } => commands::validate::run(path),
        Commands::Gate { path, ceiling } => commands::gate::run(path, ceiling),
        Commands::Replay { path } => commands::replay::run(path),
    }
}
