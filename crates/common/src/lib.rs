//! Dashcam Common Utilities
//!
//! Shared infrastructure for all Dashcam crates:
//! - Error types and result aliases
//! - Session clock for envelope timestamping
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
