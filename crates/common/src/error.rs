//! Error types shared across Dashcam crates.

use std::path::PathBuf;

/// Top-level error type for Dashcam operations.
#[derive(Debug, thiserror::Error)]
pub enum DashcamError {
    #[error("Snapshot error: {message}")]
    Snapshot { message: String },

    #[error("Restore error: {message}")]
    Restore { message: String },

    #[error("Replay error: {message}")]
    Replay { message: String },

    #[error("Player mount failure: {message}")]
    PlayerMount { message: String },

    #[error("Malformed session document: {message}")]
    MalformedDocument { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using DashcamError.
pub type DashcamResult<T> = Result<T, DashcamError>;

impl DashcamError {
    pub fn snapshot(msg: impl Into<String>) -> Self {
        Self::Snapshot {
            message: msg.into(),
        }
    }

    pub fn restore(msg: impl Into<String>) -> Self {
        Self::Restore {
            message: msg.into(),
        }
    }

    pub fn replay(msg: impl Into<String>) -> Self {
        Self::Replay {
            message: msg.into(),
        }
    }

    pub fn player_mount(msg: impl Into<String>) -> Self {
        Self::PlayerMount {
            message: msg.into(),
        }
    }

    pub fn malformed_document(msg: impl Into<String>) -> Self {
        Self::MalformedDocument {
            message: msg.into(),
        }
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }
}
