//! Deterministic serialization of sessions to the interchange format.
//!
//! The persisted artifact is a single JSON array of envelopes, in
//! capture order. Size is always measured from the serialized text, not
//! estimated; this component imposes no ceiling of its own (documents
//! of tens of megabytes are expected).

use std::path::Path;

use crate::envelope::Envelope;
use crate::session::Session;

/// Result of rejecting a document that is not a well-formed envelope
/// sequence. User-visible status, never a crash.
#[derive(Debug, thiserror::Error)]
#[error("malformed session document: {reason}")]
pub struct DocumentError {
    pub reason: String,
}

impl DocumentError {
    fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A serialized session document with its measured size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializedSession {
    /// The JSON document (an array of envelopes).
    pub json: String,

    /// Exact byte length of `json`.
    pub size_bytes: usize,
}

/// Serialize a session to its interchange form.
///
/// Deterministic for equal envelope content: order is preserved and no
/// map-ordering ambiguity exists at the array level.
pub fn serialize(session: &Session) -> Result<SerializedSession, serde_json::Error> {
    let json = serde_json::to_string(session.envelopes())?;
    let size_bytes = json.len();
    Ok(SerializedSession { json, size_bytes })
}

/// Parse a document back into an envelope sequence.
///
/// Anything that is not a JSON array of well-formed envelopes is a
/// [`DocumentError`].
pub fn parse_document(raw: &str) -> Result<Vec<Envelope>, DocumentError> {
    let value: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| DocumentError::new(format!("invalid JSON: {e}")))?;

    let items = value
        .as_array()
        .ok_or_else(|| DocumentError::new("expected a JSON array of envelopes"))?;

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value(item.clone())
                .map_err(|e| DocumentError::new(format!("envelope {i}: {e}")))
        })
        .collect()
}

/// Write a serialized session to disk.
pub fn save_document(serialized: &SerializedSession, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, &serialized.json)
}

/// Read and parse a session document from disk.
pub fn load_document(path: &Path) -> Result<Vec<Envelope>, DocumentError> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| DocumentError::new(format!("cannot read {}: {e}", path.display())))?;
    parse_document(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{Envelope, EnvelopeKind, MouseInteractionKind};
    use crate::session::{Session, SessionMeta};
    use proptest::prelude::*;
    use serde_json::json;

    fn sample_session() -> Session {
        let mut session = Session::new(SessionMeta::new("test"));
        session.push(Envelope::meta(100, "https://example.test", 800, 600));
        session.push(Envelope::full_snapshot(100, json!({ "id": 1 })));
        session.push(Envelope::pointer_move(150, 0.2, 0.4, 7));
        session.push(Envelope::mouse_interaction(
            150,
            MouseInteractionKind::Click,
            7,
            0.2,
            0.4,
        ));
        session
    }

    #[test]
    fn test_serialize_measures_actual_size() {
        let session = sample_session();
        let serialized = serialize(&session).unwrap();
        assert_eq!(serialized.size_bytes, serialized.json.len());
        assert!(serialized.json.starts_with('['));
    }

    #[test]
    fn test_serialize_is_deterministic() {
        let session = sample_session();
        let a = serialize(&session).unwrap();
        let b = serialize(&session).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_roundtrip_preserves_order_and_content() {
        let session = sample_session();
        let serialized = serialize(&session).unwrap();
        let parsed = parse_document(&serialized.json).unwrap();
        assert_eq!(parsed, session.envelopes());
    }

    #[test]
    fn test_parse_rejects_non_array() {
        assert!(parse_document("{\"type\":5}").is_err());
        assert!(parse_document("not json at all").is_err());
        assert!(parse_document("42").is_err());
    }

    #[test]
    fn test_parse_rejects_malformed_envelope_with_position() {
        let raw = r#"[{"type":4,"timestamp":1,"data":{}},{"type":"bogus"}]"#;
        let err = parse_document(raw).unwrap_err();
        assert!(err.reason.contains("envelope 1"));
    }

    #[test]
    fn test_empty_array_is_well_formed() {
        assert_eq!(parse_document("[]").unwrap(), vec![]);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let session = sample_session();
        let serialized = serialize(&session).unwrap();

        let dir = std::env::temp_dir().join("dashcam-document-test");
        let path = dir.join("session.json");
        save_document(&serialized, &path).unwrap();

        let loaded = load_document(&path).unwrap();
        assert_eq!(loaded, session.envelopes());

        std::fs::remove_dir_all(&dir).ok();
    }

    fn arb_envelope() -> impl Strategy<Value = Envelope> {
        let kind = prop_oneof![
            Just(EnvelopeKind::DomContentLoaded),
            Just(EnvelopeKind::Load),
            Just(EnvelopeKind::FullSnapshot),
            Just(EnvelopeKind::IncrementalSnapshot),
            Just(EnvelopeKind::Meta),
            Just(EnvelopeKind::Custom),
            Just(EnvelopeKind::Plugin),
        ];
        (kind, any::<u32>(), any::<i64>(), "[a-z]{0,12}").prop_map(|(kind, ts, num, text)| {
            Envelope::new(kind, ts as u64, json!({ "n": num, "s": text }))
        })
    }

    proptest! {
        #[test]
        fn prop_roundtrip_is_identity(envelopes in proptest::collection::vec(arb_envelope(), 0..32)) {
            let session = Session::from_envelopes(envelopes, SessionMeta::default());
            let serialized = serialize(&session).unwrap();
            let parsed = parse_document(&serialized.json).unwrap();
            prop_assert_eq!(parsed, session.envelopes());
        }
    }
}
