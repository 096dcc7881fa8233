//! Player backend seam.

use dashcam_common::DashcamResult;
use dashcam_session_model::Envelope;

/// The external generic event player (collaborator contract).
///
/// The engine mounts it once per replay, notifies it of every envelope
/// in order via `cast`, and tears it down before a new replay starts.
/// Generic envelope semantics live entirely behind this seam.
pub trait PlayerBackend: Send {
    /// Prepare the player for the given envelope sequence.
    fn mount(&mut self, envelopes: &[Envelope]) -> DashcamResult<()>;

    /// Notify the player that an envelope is being played.
    fn cast(&mut self, envelope: &Envelope);

    /// Release the player's resources and detach listeners.
    fn teardown(&mut self);

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// Player backend that logs casts for diagnostics.
///
/// Used by the CLI replay command, where no visual player exists.
#[derive(Debug, Default)]
pub struct LoggingPlayer {
    mounted: usize,
    cast: usize,
}

impl LoggingPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cast_count(&self) -> usize {
        self.cast
    }
}

impl PlayerBackend for LoggingPlayer {
    fn mount(&mut self, envelopes: &[Envelope]) -> DashcamResult<()> {
        self.mounted = envelopes.len();
        self.cast = 0;
        tracing::info!(envelopes = self.mounted, "Player mounted");
        Ok(())
    }

    fn cast(&mut self, envelope: &Envelope) {
        self.cast += 1;
        tracing::debug!(
            seq = self.cast,
            kind = envelope.kind.name(),
            timestamp = envelope.timestamp,
            "Cast"
        );
    }

    fn teardown(&mut self) {
        tracing::info!(cast = self.cast, mounted = self.mounted, "Player torn down");
    }

    fn name(&self) -> &str {
        "logging"
    }
}
