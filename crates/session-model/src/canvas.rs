//! Canvas-snapshot payload schema and data-URL helpers.
//!
//! Drawing surfaces (bitmap-backed render targets) are not
//! reconstructible from the generic event stream, so the sampler
//! periodically captures their pixel contents and injects them as
//! custom envelopes. The wire form is fixed: recorded documents are
//! replayed by foreign players that match on these exact field names.

use serde::{Deserialize, Serialize};

/// Tag identifying a canvas-snapshot custom envelope (`data.tag`).
pub const CANVAS_SNAPSHOT_TAG: &str = "canvas-snapshot";

/// One sampled drawing surface inside a canvas-snapshot envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceSnapshot {
    /// Position of the surface in the capture context's registry.
    /// Stable across a session only while the surface set is unchanged.
    pub index: usize,

    /// Surface width in pixels.
    pub width: u32,

    /// Surface height in pixels.
    pub height: u32,

    /// Encoded image as a `data:<mime>;base64,...` URL.
    #[serde(rename = "dataURL")]
    pub data_url: String,

    /// Approximate payload size in KB, derived from the data URL.
    /// Informational only; parsers must not validate it.
    #[serde(rename = "sizeKB")]
    pub size_kb: u64,

    /// Surface identifier assigned by the capture context.
    pub id: String,
}

/// Payload of a canvas-snapshot custom envelope (`data.payload`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSnapshotPayload {
    /// All surfaces successfully sampled in one tick, in registry order.
    pub snapshots: Vec<SurfaceSnapshot>,

    /// Capture time in UNIX epoch milliseconds.
    pub timestamp: u64,
}

impl SurfaceSnapshot {
    /// Build a snapshot entry, deriving `sizeKB` from the data URL.
    pub fn new(
        index: usize,
        width: u32,
        height: u32,
        data_url: String,
        id: impl Into<String>,
    ) -> Self {
        let size_kb = (data_url.len() as u64).div_ceil(1024);
        Self {
            index,
            width,
            height,
            data_url,
            size_kb,
            id: id.into(),
        }
    }
}

/// Wrap encoded image bytes in a base64 data URL.
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    use base64::Engine;
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{encoded}")
}

/// Split a data URL into its MIME type and decoded bytes.
///
/// Returns `None` if the string is not a base64 data URL.
pub fn parse_data_url(data_url: &str) -> Option<(String, Vec<u8>)> {
    use base64::Engine;
    let rest = data_url.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload)
        .ok()?;
    Some((mime.to_string(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_kb_is_derived_and_rounded_up() {
        let snap = SurfaceSnapshot::new(0, 64, 64, "x".repeat(1500), "plot");
        assert_eq!(snap.size_kb, 2);

        let tiny = SurfaceSnapshot::new(0, 1, 1, "data:".to_string(), "dot");
        assert_eq!(tiny.size_kb, 1);
    }

    #[test]
    fn test_wire_field_names() {
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
        let json = serde_json::to_string(&payload).unwrap();
        assert!(json.contains("\"dataURL\""));
        assert!(json.contains("\"sizeKB\""));
        assert!(json.contains("\"index\":0"));
        assert!(json.contains("\"id\":\"plot\""));
    }

    #[test]
    fn test_data_url_roundtrip() {
        let bytes = vec![0xffu8, 0xd8, 0xff, 0xe0, 0x00, 0x10];
        let url = encode_data_url("image/jpeg", &bytes);
        assert!(url.starts_with("data:image/jpeg;base64,"));

        let (mime, decoded) = parse_data_url(&url).unwrap();
        assert_eq!(mime, "image/jpeg");
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn test_parse_rejects_non_data_urls() {
        assert!(parse_data_url("https://example.test/img.png").is_none());
        assert!(parse_data_url("data:image/png,rawpayload").is_none());
        assert!(parse_data_url("data:image/png;base64,@@@").is_none());
    }
}
