//! Logging and tracing initialization.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Initialize the tracing subscriber from the given configuration.
///
/// `RUST_LOG` overrides the configured level filter. When a log file is
/// configured, output is appended there instead of going to stdout.
pub fn init_logging(config: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let writer = log_writer(config.file.as_deref());

    if config.json {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(writer)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    } else {
        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(env_filter)
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .finish();
        tracing::subscriber::set_global_default(subscriber).ok();
    }
}

/// Writer for the subscriber: an append-mode log file when one is
/// configured, stdout otherwise. A file that cannot be opened falls
/// back to stdout; the subscriber is not up yet, so the failure goes
/// to stderr directly.
fn log_writer(path: Option<&Path>) -> BoxMakeWriter {
    let Some(path) = path else {
        return BoxMakeWriter::new(std::io::stdout);
    };
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => BoxMakeWriter::new(Arc::new(file)),
        Err(e) => {
            eprintln!("dashcam: cannot open log file {}: {e}", path.display());
            BoxMakeWriter::new(std::io::stdout)
        }
    }
}

/// Initialize logging with defaults (useful for tests and quick scripts).
pub fn init_default_logging() {
    init_logging(&LoggingConfig::default());
}
