//! Transport gate: routes serialized sessions by size.

use serde::{Deserialize, Serialize};

use dashcam_session_model::{SerializedSession, Session, SessionSummary};

/// Environment override for the channel ceiling.
pub const CHANNEL_CEILING_ENV: &str = "DASHCAM_CHANNEL_CEILING";

/// Byte constraints of the realtime channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelLimits {
    /// Largest message the channel accepts, in bytes.
    pub max_message_bytes: usize,
}

impl ChannelLimits {
    pub fn new(max_message_bytes: usize) -> Self {
        Self { max_message_bytes }
    }

    /// Resolve the ceiling: environment override wins over the
    /// configured default. A malformed override is ignored with a
    /// warning.
    pub fn from_env_or(default_bytes: usize) -> Self {
        match std::env::var(CHANNEL_CEILING_ENV) {
            Ok(raw) => match raw.trim().parse::<usize>() {
                Ok(bytes) if bytes > 0 => Self::new(bytes),
                _ => {
                    tracing::warn!(
                        value = %raw,
                        "Ignoring malformed {} override",
                        CHANNEL_CEILING_ENV
                    );
                    Self::new(default_bytes)
                }
            },
            Err(_) => Self::new(default_bytes),
        }
    }
}

/// Delivery path for a serialized session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The document fits and may cross the realtime channel inline.
    Inline { summary: SessionSummary },

    /// The document must stay local (file save or held reference);
    /// only the summary may cross the channel.
    SideChannel { summary: SessionSummary },
}

impl Delivery {
    pub fn is_inline(&self) -> bool {
        matches!(self, Self::Inline { .. })
    }

    pub fn summary(&self) -> &SessionSummary {
        match self {
            Self::Inline { summary } | Self::SideChannel { summary } => summary,
        }
    }

    /// Short human-readable path name.
    pub fn path_name(&self) -> &'static str {
        match self {
            Self::Inline { .. } => "inline",
            Self::SideChannel { .. } => "side-channel",
        }
    }
}

/// Decide the delivery path for a serialized session.
///
/// The decision is size-only: content never influences routing, and an
/// oversized document is never truncated to fit.
pub fn route(session: &Session, serialized: &SerializedSession, limits: ChannelLimits) -> Delivery {
    let summary = SessionSummary::of(session, serialized.size_bytes);

    if serialized.size_bytes < limits.max_message_bytes {
        tracing::debug!(
            size_bytes = serialized.size_bytes,
            ceiling = limits.max_message_bytes,
            "Document deliverable inline"
        );
        Delivery::Inline { summary }
    } else {
        tracing::info!(
            size_bytes = serialized.size_bytes,
            ceiling = limits.max_message_bytes,
            "Document exceeds channel ceiling; routing to side channel"
        );
        Delivery::SideChannel { summary }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashcam_session_model::{document, Envelope, SessionMeta};
    use serde_json::json;

    fn session_with_payload(bytes: usize) -> (Session, SerializedSession) {
        let mut session = Session::new(SessionMeta::new("test"));
        session.push(Envelope::custom(100, "blob", json!({ "fill": "x".repeat(bytes) })));
        let serialized = document::serialize(&session).unwrap();
        (session, serialized)
    }

    #[test]
    fn test_small_document_routes_inline() {
        let (session, serialized) = session_with_payload(16);
        let delivery = route(&session, &serialized, ChannelLimits::new(1024 * 1024));
        assert!(delivery.is_inline());
        assert_eq!(delivery.summary().envelope_count, 1);
    }

    #[test]
    fn test_oversized_document_routes_to_side_channel() {
        let (session, serialized) = session_with_payload(4096);
        let delivery = route(&session, &serialized, ChannelLimits::new(1024));
        assert!(!delivery.is_inline());
        assert_eq!(delivery.path_name(), "side-channel");
    }

    #[test]
    fn test_exact_ceiling_is_side_channel() {
        let (session, serialized) = session_with_payload(64);
        let at_ceiling = ChannelLimits::new(serialized.size_bytes);
        assert!(!route(&session, &serialized, at_ceiling).is_inline());

        let above_ceiling = ChannelLimits::new(serialized.size_bytes + 1);
        assert!(route(&session, &serialized, above_ceiling).is_inline());
    }

    #[test]
    fn test_summary_size_is_bounded_regardless_of_document_size() {
        let (small_session, small) = session_with_payload(8);
        let (large_session, large) = session_with_payload(512 * 1024);

        let limits = ChannelLimits::new(1024);
        let small_summary = serde_json::to_string(route(&small_session, &small, limits).summary())
            .unwrap();
        let large_summary = serde_json::to_string(route(&large_session, &large, limits).summary())
            .unwrap();

        // The channel payload for an oversized document is the summary
        // alone, and its encoded size stays flat as the document grows.
        assert!(large_summary.len() < 256);
        assert!(large_summary.len() <= small_summary.len() + 8);
    }
}
