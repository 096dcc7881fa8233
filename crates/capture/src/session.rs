//! Capture session orchestration.
//!
//! Ties the clock, the buffer, and the sampler into one start/stop
//! lifecycle. The recording state that the original hosts kept in an
//! ambient global lives here as an explicit object, passed by handle to
//! the sampler task and to event producers.

use dashcam_common::SessionClock;
use dashcam_session_model::{Envelope, Session, SessionMeta};

use crate::buffer::{AppendOutcome, EnvelopeEmitter, SharedBuffer, StartOutcome, StopOutcome};
use crate::sampler::{SamplerConfig, SnapshotSampler};
use crate::surface::{DrawingSurface, SharedSurfaceRegistry};

/// Configuration for a capture session.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Originating capture context, stamped into session metadata.
    pub origin: String,

    /// Sampler parameters.
    pub sampler: SamplerConfig,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            origin: "dashcam".to_string(),
            sampler: SamplerConfig::default(),
        }
    }
}

/// One capture context: buffer, surface registry, and sampler lifetime.
///
/// At most one recording is active per session object; a second start
/// reports `AlreadyRecording` and changes nothing.
pub struct CaptureSession {
    config: CaptureConfig,
    buffer: SharedBuffer,
    registry: SharedSurfaceRegistry,
    clock: Option<SessionClock>,
    sampler: Option<SnapshotSampler>,
}

impl CaptureSession {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            buffer: SharedBuffer::new(),
            registry: SharedSurfaceRegistry::new(),
            clock: None,
            sampler: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.buffer.is_recording()
    }

    /// The session clock, present while recording.
    pub fn clock(&self) -> Option<&SessionClock> {
        self.clock.as_ref()
    }

    /// Surface registration hook ("surface became available").
    pub fn register_surface(&self, surface: Box<dyn DrawingSurface>) -> usize {
        self.registry.add(surface)
    }

    /// Surface removal hook ("surface removed").
    pub fn remove_surface(&self, id: &str) -> bool {
        self.registry.remove(id)
    }

    /// Registry handle for the replay engine or direct inspection.
    pub fn registry(&self) -> SharedSurfaceRegistry {
        self.registry.clone()
    }

    /// Append handle for the external recording library's emit callback.
    pub fn emitter(&self) -> EnvelopeEmitter {
        self.buffer.emitter()
    }

    /// Append an envelope directly (valid only while recording).
    pub fn append(&self, envelope: Envelope) -> AppendOutcome {
        self.buffer.append(envelope)
    }

    /// Start recording: fresh session, anchored clock, sampler running.
    pub fn start(&mut self) -> StartOutcome {
        let outcome = self
            .buffer
            .start(SessionMeta::new(self.config.origin.clone()));
        if outcome == StartOutcome::AlreadyRecording {
            return outcome;
        }

        let clock = SessionClock::start();
        self.sampler = Some(SnapshotSampler::spawn(
            self.buffer.clone(),
            self.registry.clone(),
            clock.clone(),
            self.config.sampler,
        ));
        self.clock = Some(clock);

        tracing::info!(
            origin = %self.config.origin,
            interval_ms = self.config.sampler.interval.as_millis() as u64,
            "Capture session started"
        );
        outcome
    }

    /// Stop recording and return the frozen session.
    ///
    /// The sampler is cancelled and awaited before the buffer freezes,
    /// so no tick can append to the finalized session.
    pub async fn stop(&mut self) -> StopOutcome {
        if let Some(sampler) = self.sampler.take() {
            let ticks = sampler.stop().await;
            tracing::debug!(ticks, "Sampler drained before freeze");
        }
        self.clock = None;
        self.buffer.stop()
    }

    /// Stop if recording and always hand back a (possibly empty)
    /// session. Convenience for hosts that treat stop-while-idle as a
    /// plain refresh.
    pub async fn stop_or_empty(&mut self) -> Session {
        match self.stop().await {
            StopOutcome::Stopped(session) => session,
            StopOutcome::NotRecording => Session::new(SessionMeta::new(self.config.origin.clone())),
        }
    }
}
