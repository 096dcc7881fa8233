//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory where recorded session documents are stored.
    pub sessions_dir: PathBuf,

    /// Default capture settings.
    pub capture: CaptureDefaults,

    /// Realtime channel settings.
    pub transport: TransportDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default capture parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureDefaults {
    /// Canvas snapshot sampling interval in milliseconds.
    pub snapshot_interval_ms: u64,

    /// Encoder quality factor for canvas snapshots [0.0, 1.0].
    pub snapshot_quality: f64,

    /// Image format for snapshot data URLs ("jpeg" or "png").
    pub snapshot_format: String,
}

/// Realtime channel parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportDefaults {
    /// Largest message the realtime channel accepts, in bytes.
    pub max_message_bytes: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "dashcam=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sessions_dir: dirs_default_sessions(),
            capture: CaptureDefaults::default(),
            transport: TransportDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CaptureDefaults {
    fn default() -> Self {
        Self {
            snapshot_interval_ms: 1000,
            snapshot_quality: 0.6,
            snapshot_format: "jpeg".to_string(),
        }
    }
}

impl Default for TransportDefaults {
    fn default() -> Self {
        Self {
            max_message_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("dashcam").join("config.json")
}

/// Default directory for recorded session documents.
fn dirs_default_sessions() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("dashcam").join("sessions")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_recording_contract() {
        let config = AppConfig::default();
        assert_eq!(config.capture.snapshot_interval_ms, 1000);
        assert!((config.capture.snapshot_quality - 0.6).abs() < 1e-9);
        assert_eq!(config.capture.snapshot_format, "jpeg");
        assert_eq!(config.transport.max_message_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_config_roundtrip() {
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(
            parsed.capture.snapshot_interval_ms,
            config.capture.snapshot_interval_ms
        );
        assert_eq!(
            parsed.transport.max_message_bytes,
            config.transport.max_message_bytes
        );
    }
}
