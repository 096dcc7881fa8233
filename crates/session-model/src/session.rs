//! Session container and summary types.

use serde::{Deserialize, Serialize};

use crate::envelope::{Envelope, TimestampMs};

/// Capture-time metadata for a session.
///
/// Bookkeeping only: the persisted document is the bare envelope array,
/// so this never crosses the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMeta {
    /// Wall-clock time when recording started (ISO 8601).
    pub created_at: String,

    /// Originating capture context (e.g., a dashboard name).
    pub origin: String,
}

impl SessionMeta {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            created_at: chrono::Utc::now().to_rfc3339(),
            origin: origin.into(),
        }
    }
}

impl Default for SessionMeta {
    fn default() -> Self {
        Self::new("unknown")
    }
}

/// An ordered sequence of envelopes captured between start and stop.
///
/// Mutated only by appends while recording; frozen at stop and consumed
/// read-only afterwards. Appends never reorder, so timestamps stay
/// non-decreasing as long as the producing clock is.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    envelopes: Vec<Envelope>,
    meta: SessionMeta,
}

impl Session {
    /// Create an empty session.
    pub fn new(meta: SessionMeta) -> Self {
        Self {
            envelopes: Vec::new(),
            meta,
        }
    }

    /// Build a session from already-captured envelopes (e.g., an upload).
    pub fn from_envelopes(envelopes: Vec<Envelope>, meta: SessionMeta) -> Self {
        Self { envelopes, meta }
    }

    /// Append an envelope, preserving call order.
    pub fn push(&mut self, envelope: Envelope) {
        self.envelopes.push(envelope);
    }

    /// Drop all envelopes, keeping the metadata.
    pub fn clear(&mut self) {
        self.envelopes.clear();
    }

    pub fn envelopes(&self) -> &[Envelope] {
        &self.envelopes
    }

    pub fn meta(&self) -> &SessionMeta {
        &self.meta
    }

    pub fn len(&self) -> usize {
        self.envelopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.envelopes.is_empty()
    }

    /// Timestamp of the first envelope.
    pub fn first_timestamp(&self) -> Option<TimestampMs> {
        self.envelopes.first().map(|e| e.timestamp)
    }

    /// Timestamp of the last envelope.
    pub fn last_timestamp(&self) -> Option<TimestampMs> {
        self.envelopes.last().map(|e| e.timestamp)
    }

    /// Recording duration in milliseconds (last minus first timestamp).
    pub fn duration_ms(&self) -> u64 {
        match (self.first_timestamp(), self.last_timestamp()) {
            (Some(first), Some(last)) => last.saturating_sub(first),
            _ => 0,
        }
    }

    /// Number of canvas-snapshot envelopes.
    pub fn canvas_envelope_count(&self) -> usize {
        self.envelopes
            .iter()
            .filter(|e| e.is_canvas_snapshot())
            .count()
    }

    /// Consume the session, yielding its envelopes.
    pub fn into_envelopes(self) -> Vec<Envelope> {
        self.envelopes
    }
}

/// Fixed-size, human-readable digest of a session.
///
/// This is the only representation of an oversized document allowed
/// across the size-constrained channel, so it must stay small and flat
/// regardless of how large the session is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Total envelope count.
    pub envelope_count: usize,

    /// Canvas-snapshot envelope count.
    pub canvas_envelope_count: usize,

    /// Serialized document size in bytes.
    pub size_bytes: usize,

    /// Recording duration in milliseconds.
    pub duration_ms: u64,
}

impl SessionSummary {
    /// Summarize a session and its serialized size.
    pub fn of(session: &Session, size_bytes: usize) -> Self {
        Self {
            envelope_count: session.len(),
            canvas_envelope_count: session.canvas_envelope_count(),
            size_bytes,
            duration_ms: session.duration_ms(),
        }
    }

    /// One-line rendering for status displays.
    pub fn display_line(&self) -> String {
        format!(
            "{} events ({} canvas), {} bytes, {:.1}s",
            self.envelope_count,
            self.canvas_envelope_count,
            self.size_bytes,
            self.duration_ms as f64 / 1000.0
        )
    }
}
