//! Envelope types for the session event stream.
//!
//! A recorded session is an ordered list of envelopes. Each envelope is
//! `{"type": <int>, "timestamp": <epoch ms>, "data": {...}}` on the wire:
//! `type` is a small integer discriminant, `timestamp` is UNIX epoch
//! milliseconds at capture time, and `data` carries the payload.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::canvas::{CanvasSnapshotPayload, CANVAS_SNAPSHOT_TAG};

/// Envelope timestamp in UNIX epoch milliseconds.
pub type TimestampMs = u64;

/// Envelope discriminant, serialized as a bare integer.
///
/// The numeric values are wire format: recorded documents store them and
/// foreign players switch on them, so they must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum EnvelopeKind {
    DomContentLoaded = 0,
    Load = 1,
    FullSnapshot = 2,
    IncrementalSnapshot = 3,
    Meta = 4,
    Custom = 5,
    Plugin = 6,
}

impl EnvelopeKind {
    /// Decode a wire discriminant. Unknown values are rejected.
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::DomContentLoaded),
            1 => Some(Self::Load),
            2 => Some(Self::FullSnapshot),
            3 => Some(Self::IncrementalSnapshot),
            4 => Some(Self::Meta),
            5 => Some(Self::Custom),
            6 => Some(Self::Plugin),
            _ => None,
        }
    }

    /// Name used in analysis output.
    pub fn name(self) -> &'static str {
        match self {
            Self::DomContentLoaded => "DomContentLoaded",
            Self::Load => "Load",
            Self::FullSnapshot => "FullSnapshot",
            Self::IncrementalSnapshot => "IncrementalSnapshot",
            Self::Meta => "Meta",
            Self::Custom => "Custom",
            Self::Plugin => "Plugin",
        }
    }
}

impl From<EnvelopeKind> for u8 {
    fn from(kind: EnvelopeKind) -> u8 {
        kind as u8
    }
}

impl TryFrom<u8> for EnvelopeKind {
    type Error = String;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::from_u8(raw).ok_or_else(|| format!("unknown envelope type {raw}"))
    }
}

/// Source discriminant inside an incremental-snapshot payload
/// (`data.source`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum IncrementalSource {
    Mutation = 0,
    MouseMove = 1,
    MouseInteraction = 2,
    Scroll = 3,
    ViewportResize = 4,
    Input = 5,
}

impl IncrementalSource {
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Mutation),
            1 => Some(Self::MouseMove),
            2 => Some(Self::MouseInteraction),
            3 => Some(Self::Scroll),
            4 => Some(Self::ViewportResize),
            5 => Some(Self::Input),
            _ => None,
        }
    }

    /// Name used in analysis output.
    pub fn name(self) -> &'static str {
        match self {
            Self::Mutation => "Mutation",
            Self::MouseMove => "MouseMove",
            Self::MouseInteraction => "MouseInteraction",
            Self::Scroll => "Scroll",
            Self::ViewportResize => "ViewportResize",
            Self::Input => "Input",
        }
    }
}

/// Interaction discriminant inside a mouse-interaction payload
/// (`data.type`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MouseInteractionKind {
    MouseUp = 0,
    MouseDown = 1,
    Click = 2,
}

impl MouseInteractionKind {
    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::MouseUp),
            1 => Some(Self::MouseDown),
            2 => Some(Self::Click),
            _ => None,
        }
    }
}

/// A single recorded event in wire form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Envelope discriminant.
    #[serde(rename = "type")]
    pub kind: EnvelopeKind,

    /// UNIX epoch milliseconds at capture time.
    pub timestamp: TimestampMs,

    /// Payload. Opaque for foreign envelopes; canvas snapshots follow
    /// the schema in [`crate::canvas`].
    pub data: Value,
}

impl Envelope {
    /// Create an envelope with an arbitrary payload.
    pub fn new(kind: EnvelopeKind, timestamp: TimestampMs, data: Value) -> Self {
        Self {
            kind,
            timestamp,
            data,
        }
    }

    /// Create a custom envelope with the given tag and payload.
    pub fn custom(timestamp: TimestampMs, tag: impl Into<String>, payload: Value) -> Self {
        Self {
            kind: EnvelopeKind::Custom,
            timestamp,
            data: json!({ "tag": tag.into(), "payload": payload }),
        }
    }

    /// Create a canvas-snapshot envelope from a sampled payload.
    pub fn canvas_snapshot(timestamp: TimestampMs, payload: &CanvasSnapshotPayload) -> Self {
        let payload = serde_json::to_value(payload).unwrap_or(Value::Null);
        Self::custom(timestamp, CANVAS_SNAPSHOT_TAG, payload)
    }

    /// Create an incremental pointer-move envelope.
    pub fn pointer_move(timestamp: TimestampMs, x: f64, y: f64, node_id: u64) -> Self {
        Self {
            kind: EnvelopeKind::IncrementalSnapshot,
            timestamp,
            data: json!({
                "source": IncrementalSource::MouseMove as u8,
                "positions": [{ "x": x, "y": y, "id": node_id, "timeOffset": 0 }],
            }),
        }
    }

    /// Create an incremental mouse-interaction envelope.
    pub fn mouse_interaction(
        timestamp: TimestampMs,
        interaction: MouseInteractionKind,
        node_id: u64,
        x: f64,
        y: f64,
    ) -> Self {
        Self {
            kind: EnvelopeKind::IncrementalSnapshot,
            timestamp,
            data: json!({
                "source": IncrementalSource::MouseInteraction as u8,
                "type": interaction as u8,
                "id": node_id,
                "x": x,
                "y": y,
            }),
        }
    }

    /// Create an incremental scroll envelope.
    pub fn scroll(timestamp: TimestampMs, node_id: u64, x: f64, y: f64) -> Self {
        Self {
            kind: EnvelopeKind::IncrementalSnapshot,
            timestamp,
            data: json!({
                "source": IncrementalSource::Scroll as u8,
                "id": node_id,
                "x": x,
                "y": y,
            }),
        }
    }

    /// Create a meta envelope describing the recorded viewport.
    pub fn meta(timestamp: TimestampMs, href: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            kind: EnvelopeKind::Meta,
            timestamp,
            data: json!({ "href": href.into(), "width": width, "height": height }),
        }
    }

    /// Create a full-snapshot envelope with an opaque node tree.
    pub fn full_snapshot(timestamp: TimestampMs, node: Value) -> Self {
        Self {
            kind: EnvelopeKind::FullSnapshot,
            timestamp,
            data: json!({ "node": node, "initialOffset": { "left": 0, "top": 0 } }),
        }
    }

    /// Incremental source discriminant, when this is an incremental
    /// snapshot with a known source.
    pub fn incremental_source(&self) -> Option<IncrementalSource> {
        if self.kind != EnvelopeKind::IncrementalSnapshot {
            return None;
        }
        let raw = self.data.get("source")?.as_u64()?;
        u8::try_from(raw).ok().and_then(IncrementalSource::from_u8)
    }

    /// Interaction discriminant, when this is a mouse-interaction event.
    pub fn mouse_interaction_kind(&self) -> Option<MouseInteractionKind> {
        if self.incremental_source()? != IncrementalSource::MouseInteraction {
            return None;
        }
        let raw = self.data.get("type")?.as_u64()?;
        u8::try_from(raw)
            .ok()
            .and_then(MouseInteractionKind::from_u8)
    }

    /// Custom-envelope tag, when present.
    pub fn custom_tag(&self) -> Option<&str> {
        if self.kind != EnvelopeKind::Custom {
            return None;
        }
        self.data.get("tag")?.as_str()
    }

    /// Whether this envelope carries a canvas snapshot.
    pub fn is_canvas_snapshot(&self) -> bool {
        self.custom_tag() == Some(CANVAS_SNAPSHOT_TAG)
    }

    /// Decode the canvas-snapshot payload, when this envelope carries one.
    pub fn as_canvas_snapshot(&self) -> Option<CanvasSnapshotPayload> {
        if !self.is_canvas_snapshot() {
            return None;
        }
        let payload = self.data.get("payload")?;
        serde_json::from_value(payload.clone()).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::SurfaceSnapshot;

    #[test]
    fn test_kind_wire_values_are_stable() {
        assert_eq!(u8::from(EnvelopeKind::DomContentLoaded), 0);
        assert_eq!(u8::from(EnvelopeKind::Load), 1);
        assert_eq!(u8::from(EnvelopeKind::FullSnapshot), 2);
        assert_eq!(u8::from(EnvelopeKind::IncrementalSnapshot), 3);
        assert_eq!(u8::from(EnvelopeKind::Meta), 4);
        assert_eq!(u8::from(EnvelopeKind::Custom), 5);
        assert_eq!(u8::from(EnvelopeKind::Plugin), 6);
    }

    #[test]
    fn test_kind_serializes_as_bare_integer() {
        let envelope = Envelope::custom(1000, "marker", json!({}));
        let text = serde_json::to_string(&envelope).unwrap();
        assert!(text.contains("\"type\":5"));
        assert!(text.contains("\"timestamp\":1000"));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let raw = r#"{"type":42,"timestamp":1,"data":{}}"#;
        assert!(serde_json::from_str::<Envelope>(raw).is_err());
    }

    #[test]
    fn test_envelope_roundtrip_preserves_opaque_data() {
        let envelope = Envelope::new(
            EnvelopeKind::Plugin,
            1_700_000_000_000,
            json!({ "plugin": "console", "payload": { "level": "warn", "args": [1, 2, 3] } }),
        );
        let text = serde_json::to_string(&envelope).unwrap();
        let parsed: Envelope = serde_json::from_str(&text).unwrap();
        assert_eq!(envelope, parsed);
    }

    #[test]
    fn test_incremental_source_extraction() {
        let ptr = Envelope::pointer_move(10, 0.5, 0.3, 7);
        assert_eq!(ptr.incremental_source(), Some(IncrementalSource::MouseMove));

        let click = Envelope::mouse_interaction(20, MouseInteractionKind::Click, 7, 0.5, 0.3);
        assert_eq!(
            click.incremental_source(),
            Some(IncrementalSource::MouseInteraction)
        );
        assert_eq!(
            click.mouse_interaction_kind(),
            Some(MouseInteractionKind::Click)
        );

        let meta = Envelope::meta(30, "https://example.test", 800, 600);
        assert_eq!(meta.incremental_source(), None);
        assert_eq!(meta.mouse_interaction_kind(), None);
    }

    #[test]
    fn test_canvas_snapshot_detection() {
        let payload = CanvasSnapshotPayload {
            snapshots: vec![SurfaceSnapshot::new(
                0,
                320,
                240,
                "data:image/jpeg;base64,AAAA".to_string(),
                "plot",
            )],
            timestamp: 1234,
        };
        let envelope = Envelope::canvas_snapshot(1234, &payload);

        assert!(envelope.is_canvas_snapshot());
        assert_eq!(envelope.custom_tag(), Some(CANVAS_SNAPSHOT_TAG));
        let decoded = envelope.as_canvas_snapshot().unwrap();
        assert_eq!(decoded, payload);

        let other = Envelope::custom(1234, "heartbeat", json!({}));
        assert!(!other.is_canvas_snapshot());
        assert_eq!(other.as_canvas_snapshot(), None);
    }

    #[test]
    fn test_out_of_range_source_is_none() {
        let envelope = Envelope::new(
            EnvelopeKind::IncrementalSnapshot,
            1,
            json!({ "source": 4096 }),
        );
        assert_eq!(envelope.incremental_source(), None);
    }
}
