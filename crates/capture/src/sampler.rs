//! Periodic canvas-snapshot sampler.
//!
//! While recording, a timer task encodes every registered drawing
//! surface at a fixed interval and appends one canvas-snapshot envelope
//! per productive tick. The default interval is 1000 ms; finer-grained
//! sampling was measured as too expensive for the payload size it buys.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashcam_common::SessionClock;
use dashcam_session_model::{CanvasSnapshotPayload, Envelope, SurfaceSnapshot};

use crate::buffer::{AppendOutcome, SharedBuffer};
use crate::surface::{ImageFormat, SharedSurfaceRegistry, SurfaceRegistry};

/// Sampler parameters.
#[derive(Debug, Clone, Copy)]
pub struct SamplerConfig {
    /// Time between ticks.
    pub interval: Duration,

    /// Encoder quality factor in `[0.0, 1.0]`.
    pub quality: f64,

    /// Encoding applied to sampled pixels.
    pub format: ImageFormat,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(1000),
            quality: 0.6,
            format: ImageFormat::Jpeg,
        }
    }
}

/// Run one sampler tick against a registry.
///
/// Encodes every surface; a surface that fails to encode is logged and
/// skipped without aborting the tick. Returns `None` when no surface
/// produced data, so empty ticks never pollute the session.
pub fn sample_tick(
    registry: &SurfaceRegistry,
    config: &SamplerConfig,
    timestamp: u64,
) -> Option<Envelope> {
    let mut snapshots = Vec::new();

    for (index, surface) in registry.iter() {
        match surface.encode(config.format, config.quality) {
            Ok(data_url) => {
                snapshots.push(SurfaceSnapshot::new(
                    index,
                    surface.width(),
                    surface.height(),
                    data_url,
                    surface.id(),
                ));
            }
            Err(e) => {
                tracing::warn!(index, id = surface.id(), error = %e, "Surface encode failed; skipping");
            }
        }
    }

    if snapshots.is_empty() {
        return None;
    }

    let payload = CanvasSnapshotPayload {
        snapshots,
        timestamp,
    };
    Some(Envelope::canvas_snapshot(timestamp, &payload))
}

/// Handle to a running sampler task.
///
/// The task is bound to one recording: `stop` raises the flag and
/// awaits the task, so no tick can land after the caller freezes the
/// buffer. A tick that races the flag is still discarded by the
/// buffer's own state check.
pub struct SnapshotSampler {
    stop_flag: Arc<AtomicBool>,
    task: tokio::task::JoinHandle<u64>,
}

impl SnapshotSampler {
    /// Spawn the periodic sampler task.
    pub fn spawn(
        buffer: SharedBuffer,
        registry: SharedSurfaceRegistry,
        clock: SessionClock,
        config: SamplerConfig,
    ) -> Self {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let flag = stop_flag.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(config.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            // The first interval tick fires immediately; consume it so
            // the first sample lands one full interval after start.
            ticker.tick().await;

            let mut ticks_appended = 0u64;
            loop {
                ticker.tick().await;
                if flag.load(Ordering::SeqCst) {
                    break;
                }

                let timestamp = clock.now_ms();
                let envelope = registry.with(|reg| sample_tick(reg, &config, timestamp));

                let Some(envelope) = envelope else {
                    tracing::debug!(timestamp, "Sampler tick found no surfaces");
                    continue;
                };

                match buffer.append(envelope) {
                    AppendOutcome::Appended => ticks_appended += 1,
                    AppendOutcome::Discarded => {
                        tracing::debug!(timestamp, "Sampler tick raced stop; discarded");
                    }
                }
            }

            tracing::info!(ticks_appended, "Snapshot sampler stopped");
            ticks_appended
        });

        Self { stop_flag, task }
    }

    /// Cancel the timer and wait for the task to drain.
    ///
    /// Returns the number of ticks that appended an envelope.
    pub async fn stop(self) -> u64 {
        self.stop_flag.store(true, Ordering::SeqCst);
        match self.task.await {
            Ok(ticks) => ticks,
            Err(e) => {
                tracing::warn!(error = %e, "Sampler task join failed");
                0
            }
        }
    }
}
