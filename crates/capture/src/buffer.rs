//! Append-only capture buffer and its state machine.

use std::sync::{Arc, Mutex, PoisonError};

use dashcam_session_model::{Envelope, Session, SessionMeta};

/// Buffer state. Initial and terminal state for one session is `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    Idle,
    Recording,
}

/// Outcome of a `start` call.
#[derive(Debug, Clone, PartialEq)]
pub enum StartOutcome {
    /// Transitioned Idle -> Recording with a fresh, empty session.
    Started,
    /// Already recording; the live session is untouched.
    AlreadyRecording,
}

/// Outcome of an `append` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    Appended,
    /// The buffer was Idle; the envelope was dropped. Late sampler
    /// ticks that race a stop land here.
    Discarded,
}

/// Outcome of a `stop` call.
#[derive(Debug)]
pub enum StopOutcome {
    /// Transitioned Recording -> Idle; the finalized session is yours.
    Stopped(Session),
    NotRecording,
}

impl StartOutcome {
    /// Short human-readable status for UI surfaces.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Started => "recording",
            Self::AlreadyRecording => "already recording",
        }
    }
}

impl StopOutcome {
    /// Short human-readable status for UI surfaces.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Stopped(_) => "stopped",
            Self::NotRecording => "not recording",
        }
    }

    /// The finalized session, if recording was actually stopped.
    pub fn into_session(self) -> Option<Session> {
        match self {
            Self::Stopped(session) => Some(session),
            Self::NotRecording => None,
        }
    }
}

/// The capture buffer: exclusive owner of the live session.
///
/// Appends are never rejected for capacity; the target environment
/// holds the session in memory. Misuse of the state machine (double
/// start, stop while idle, append while idle) is reported through the
/// outcome enums, not errors.
#[derive(Debug)]
pub struct CaptureBuffer {
    state: BufferState,
    session: Session,
    discarded: u64,
}

impl CaptureBuffer {
    pub fn new() -> Self {
        Self {
            state: BufferState::Idle,
            session: Session::new(SessionMeta::default()),
            discarded: 0,
        }
    }

    pub fn state(&self) -> BufferState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == BufferState::Recording
    }

    /// Envelopes accumulated so far (live view while recording).
    pub fn len(&self) -> usize {
        self.session.len()
    }

    pub fn is_empty(&self) -> bool {
        self.session.is_empty()
    }

    /// Envelopes discarded because the buffer was Idle.
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    /// Begin recording. Clears prior envelopes and stamps fresh
    /// metadata; a second start without a stop changes nothing.
    pub fn start(&mut self, meta: SessionMeta) -> StartOutcome {
        if self.state == BufferState::Recording {
            tracing::debug!("Start requested while already recording");
            return StartOutcome::AlreadyRecording;
        }

        self.session = Session::new(meta);
        self.state = BufferState::Recording;
        tracing::info!(origin = %self.session.meta().origin, "Capture buffer recording");
        StartOutcome::Started
    }

    /// Append an envelope in call order. Valid only while Recording;
    /// otherwise the envelope is dropped and counted.
    pub fn append(&mut self, envelope: Envelope) -> AppendOutcome {
        if self.state != BufferState::Recording {
            self.discarded += 1;
            tracing::debug!(
                timestamp = envelope.timestamp,
                discarded = self.discarded,
                "Discarding envelope appended while idle"
            );
            return AppendOutcome::Discarded;
        }

        self.session.push(envelope);
        AppendOutcome::Appended
    }

    /// Stop recording and hand over the frozen session.
    pub fn stop(&mut self) -> StopOutcome {
        if self.state != BufferState::Recording {
            tracing::debug!("Stop requested while idle");
            return StopOutcome::NotRecording;
        }

        self.state = BufferState::Idle;
        let session = std::mem::replace(&mut self.session, Session::new(SessionMeta::default()));
        tracing::info!(
            envelopes = session.len(),
            duration_ms = session.duration_ms(),
            "Capture buffer stopped"
        );
        StopOutcome::Stopped(session)
    }
}

impl Default for CaptureBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared handle to a capture buffer.
///
/// The single-threaded event model of the original host needed no lock;
/// a multi-threaded host must serialize appends against the freeze, so
/// the shared form carries a mutex.
#[derive(Debug, Clone)]
pub struct SharedBuffer {
    inner: Arc<Mutex<CaptureBuffer>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(CaptureBuffer::new())),
        }
    }

    /// Run a closure with the locked buffer. Poisoning is recovered:
    /// the buffer's state machine stays valid across a payload panic.
    pub fn with<R>(&self, f: impl FnOnce(&mut CaptureBuffer) -> R) -> R {
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub fn start(&self, meta: SessionMeta) -> StartOutcome {
        self.with(|buffer| buffer.start(meta))
    }

    pub fn append(&self, envelope: Envelope) -> AppendOutcome {
        self.with(|buffer| buffer.append(envelope))
    }

    pub fn stop(&self) -> StopOutcome {
        self.with(|buffer| buffer.stop())
    }

    pub fn is_recording(&self) -> bool {
        self.with(|buffer| buffer.is_recording())
    }

    /// Clonable append handle for external event producers.
    pub fn emitter(&self) -> EnvelopeEmitter {
        EnvelopeEmitter {
            buffer: self.clone(),
        }
    }
}

impl Default for SharedBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Append handle passed to the external recording library's emit
/// callback. Emitting while idle is a counted discard, matching the
/// buffer's own contract.
#[derive(Debug, Clone)]
pub struct EnvelopeEmitter {
    buffer: SharedBuffer,
}

impl EnvelopeEmitter {
    pub fn emit(&self, envelope: Envelope) -> AppendOutcome {
        self.buffer.append(envelope)
    }
}
