//! Clock utilities for envelope timestamping.
//!
//! Envelope timestamps are UNIX epoch milliseconds. Reading the system
//! clock for every envelope would let an NTP step move timestamps
//! backwards mid-session, so the clock is anchored once when recording
//! starts and advanced from a monotonic instant. Timestamps produced by
//! one clock are therefore non-decreasing.

use std::time::Instant;

/// A session clock producing non-decreasing epoch-millisecond timestamps.
#[derive(Debug, Clone)]
pub struct SessionClock {
    /// Monotonic anchor taken when the clock started.
    origin: Instant,

    /// UNIX epoch milliseconds at the anchor.
    origin_epoch_ms: u64,

    /// Wall-clock time at the anchor (ISO 8601).
    origin_wall: String,
}

impl SessionClock {
    /// Create a clock anchored to now.
    pub fn start() -> Self {
        let now = chrono::Utc::now();
        Self {
            origin: Instant::now(),
            origin_epoch_ms: now.timestamp_millis().max(0) as u64,
            origin_wall: now.to_rfc3339(),
        }
    }

    /// Epoch milliseconds at this moment.
    pub fn now_ms(&self) -> u64 {
        self.origin_epoch_ms + self.origin.elapsed().as_millis() as u64
    }

    /// Milliseconds elapsed since the anchor.
    pub fn elapsed_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    /// Epoch milliseconds at the anchor.
    pub fn origin_ms(&self) -> u64 {
        self.origin_epoch_ms
    }

    /// Wall-clock time at the anchor.
    pub fn origin_wall(&self) -> &str {
        &self.origin_wall
    }
}
