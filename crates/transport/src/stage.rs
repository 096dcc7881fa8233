//! Upload staging for session documents.
//!
//! A document uploaded for replay is parsed and validated once, then
//! kept resident in the capture context's memory. The constrained
//! channel only ever sees a receipt (item count + summary); the staged
//! envelopes reach the replay engine by reference via `take`.

use serde::{Deserialize, Serialize};

use dashcam_common::{DashcamError, DashcamResult};
use dashcam_session_model::{document, Session, SessionMeta, SessionSummary};

use crate::gate::{ChannelLimits, Delivery};

/// How a staged document would have been delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeliveryKind {
    Inline,
    SideChannel,
}

impl From<&Delivery> for DeliveryKind {
    fn from(delivery: &Delivery) -> Self {
        match delivery {
            Delivery::Inline { .. } => Self::Inline,
            Delivery::SideChannel { .. } => Self::SideChannel,
        }
    }
}

/// Channel-sized acknowledgement of a staged upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    /// Number of envelopes in the staged document.
    pub item_count: usize,

    /// Fixed-size digest of the staged session.
    pub summary: SessionSummary,

    /// Delivery classification under the current limits.
    pub delivery: DeliveryKind,
}

/// A validated upload held in local memory.
#[derive(Debug)]
pub struct StagedSession {
    session: Session,
    size_bytes: usize,
}

impl StagedSession {
    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }
}

/// Accepts uploads, validates them, and holds them for replay.
///
/// Holds at most one staged session; accepting a new upload replaces
/// the previous one.
#[derive(Debug)]
pub struct SessionStage {
    limits: ChannelLimits,
    staged: Option<StagedSession>,
}

impl SessionStage {
    pub fn new(limits: ChannelLimits) -> Self {
        Self {
            limits,
            staged: None,
        }
    }

    pub fn limits(&self) -> ChannelLimits {
        self.limits
    }

    /// Parse, validate, and stage a raw document.
    ///
    /// A document that is not a well-formed envelope sequence yields
    /// [`DashcamError::MalformedDocument`]: a user-visible status, not
    /// a crash, and the previously staged session (if any) survives.
    pub fn accept(&mut self, raw: &str, origin: impl Into<String>) -> DashcamResult<UploadReceipt> {
        let envelopes = document::parse_document(raw)
            .map_err(|e| DashcamError::malformed_document(e.reason))?;

        let session = Session::from_envelopes(envelopes, SessionMeta::new(origin));
        let size_bytes = raw.len();
        let summary = SessionSummary::of(&session, size_bytes);
        let delivery = if size_bytes < self.limits.max_message_bytes {
            DeliveryKind::Inline
        } else {
            DeliveryKind::SideChannel
        };

        let receipt = UploadReceipt {
            item_count: session.len(),
            summary,
            delivery,
        };

        tracing::info!(
            items = receipt.item_count,
            size_bytes,
            delivery = ?delivery,
            "Session document staged"
        );

        self.staged = Some(StagedSession {
            session,
            size_bytes,
        });
        Ok(receipt)
    }

    /// The staged session, if one is held.
    pub fn staged(&self) -> Option<&StagedSession> {
        self.staged.as_ref()
    }

    /// Hand the staged session to its consumer without re-crossing the
    /// channel. The stage is empty afterwards.
    pub fn take(&mut self) -> Option<Session> {
        self.staged.take().map(|staged| staged.session)
    }

    /// Drop any staged session.
    pub fn clear(&mut self) {
        self.staged = None;
    }
}
