//! Replay engine and single-instance controller.

use dashcam_capture::SharedSurfaceRegistry;
use dashcam_common::{DashcamError, DashcamResult};
use dashcam_session_model::{Envelope, Session};

use crate::player::PlayerBackend;

/// Counters accumulated over one replay.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Envelopes cast to the player.
    pub cast: usize,

    /// Canvas-snapshot envelopes intercepted.
    pub canvas_envelopes: usize,

    /// Snapshot entries drawn back onto a surface.
    pub surfaces_restored: usize,

    /// Snapshot entries skipped (missing index or restore failure).
    pub surfaces_skipped: usize,
}

/// One mounted replay: a player, an envelope sequence, and the replay
/// context's surface registry.
pub struct ReplayEngine {
    player: Box<dyn PlayerBackend>,
    envelopes: Vec<Envelope>,
    cursor: usize,
    registry: SharedSurfaceRegistry,
    stats: ReplayStats,
}

impl ReplayEngine {
    /// Validate and mount a replay.
    ///
    /// An empty session is "nothing to replay": reported, no player
    /// mounted. A player that fails to mount surfaces as a
    /// `PlayerMount` status.
    pub fn open(
        mut player: Box<dyn PlayerBackend>,
        session: Session,
        registry: SharedSurfaceRegistry,
    ) -> DashcamResult<Self> {
        if session.is_empty() {
            return Err(DashcamError::replay("nothing to replay"));
        }

        let envelopes = session.into_envelopes();
        player.mount(&envelopes).map_err(|e| {
            DashcamError::player_mount(format!("{} backend failed to mount: {e}", player.name()))
        })?;

        tracing::info!(
            backend = player.name(),
            envelopes = envelopes.len(),
            "Replay mounted"
        );

        Ok(Self {
            player,
            envelopes,
            cursor: 0,
            registry,
            stats: ReplayStats::default(),
        })
    }

    /// Envelopes not yet cast.
    pub fn remaining(&self) -> usize {
        self.envelopes.len() - self.cursor
    }

    pub fn stats(&self) -> ReplayStats {
        self.stats
    }

    /// Cast the next envelope. Returns `false` when playback is done.
    ///
    /// Generic envelopes delegate to the player; canvas-snapshot
    /// envelopes additionally restore each entry onto the registry
    /// surface at the matching index. A missing surface or a failed
    /// restore skips that entry only.
    pub fn step(&mut self) -> bool {
        let Some(envelope) = self.envelopes.get(self.cursor) else {
            return false;
        };
        self.cursor += 1;

        self.player.cast(envelope);
        self.stats.cast += 1;

        if let Some(payload) = envelope.as_canvas_snapshot() {
            self.stats.canvas_envelopes += 1;
            for entry in &payload.snapshots {
                let restored = self.registry.with(|registry| {
                    match registry.get_mut(entry.index) {
                        Some(surface) => match surface.restore(&entry.data_url) {
                            Ok(()) => true,
                            Err(e) => {
                                tracing::warn!(
                                    index = entry.index,
                                    id = %entry.id,
                                    error = %e,
                                    "Surface restore failed; skipping entry"
                                );
                                false
                            }
                        },
                        None => {
                            tracing::warn!(
                                index = entry.index,
                                id = %entry.id,
                                "No surface at index; skipping entry"
                            );
                            false
                        }
                    }
                });

                if restored {
                    self.stats.surfaces_restored += 1;
                } else {
                    self.stats.surfaces_skipped += 1;
                }
            }
        }

        self.cursor < self.envelopes.len()
    }

    /// Cast every remaining envelope in order.
    pub fn run_to_end(&mut self) -> ReplayStats {
        while self.step() {}
        self.stats
    }

    fn release(mut self) -> ReplayStats {
        self.player.teardown();
        self.stats
    }
}

/// Owns the at-most-one live replay engine.
///
/// Opening a replay tears down any active engine first; dropping the
/// controller releases whatever is still mounted.
#[derive(Default)]
pub struct ReplayController {
    active: Option<ReplayEngine>,
}

impl ReplayController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Mount a new replay, releasing the previous one first.
    pub fn open(
        &mut self,
        player: Box<dyn PlayerBackend>,
        session: Session,
        registry: SharedSurfaceRegistry,
    ) -> DashcamResult<()> {
        if let Some(previous) = self.active.take() {
            let stats = previous.release();
            tracing::info!(cast = stats.cast, "Previous replay released");
        }

        self.active = Some(ReplayEngine::open(player, session, registry)?);
        Ok(())
    }

    pub fn engine_mut(&mut self) -> Option<&mut ReplayEngine> {
        self.active.as_mut()
    }

    /// Tear down the active replay and return its final stats.
    pub fn close(&mut self) -> Option<ReplayStats> {
        self.active.take().map(ReplayEngine::release)
    }
}

impl Drop for ReplayController {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashcam_capture::{DrawingSurface, ImageFormat};
    use dashcam_session_model::{
        CanvasSnapshotPayload, Envelope, SessionMeta, SurfaceSnapshot,
    };
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Surface that records restore calls; shared counter survives the
    /// registry owning the box.
    struct CountingSurface {
        id: String,
        restores: Arc<AtomicUsize>,
        fail: bool,
    }

    impl CountingSurface {
        fn new(id: &str) -> (Box<Self>, Arc<AtomicUsize>) {
            let restores = Arc::new(AtomicUsize::new(0));
            (
                Box::new(Self {
                    id: id.to_string(),
                    restores: restores.clone(),
                    fail: false,
                }),
                restores,
            )
        }

        fn failing(id: &str) -> Box<Self> {
            Box::new(Self {
                id: id.to_string(),
                restores: Arc::new(AtomicUsize::new(0)),
                fail: true,
            })
        }
    }

    impl DrawingSurface for CountingSurface {
        fn id(&self) -> &str {
            &self.id
        }

        fn width(&self) -> u32 {
            100
        }

        fn height(&self) -> u32 {
            100
        }

        fn encode(&self, _format: ImageFormat, _quality: f64) -> DashcamResult<String> {
            Ok("data:image/jpeg;base64,AAAA".to_string())
        }

        fn restore(&mut self, _data_url: &str) -> DashcamResult<()> {
            if self.fail {
                return Err(DashcamError::restore("decode failed"));
            }
            self.restores.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingPlayer {
        mounted: bool,
        torn_down: Arc<AtomicUsize>,
        cast: Vec<u64>,
    }

    impl PlayerBackend for RecordingPlayer {
        fn mount(&mut self, _envelopes: &[Envelope]) -> DashcamResult<()> {
            self.mounted = true;
            Ok(())
        }

        fn cast(&mut self, envelope: &Envelope) {
            self.cast.push(envelope.timestamp);
        }

        fn teardown(&mut self) {
            self.torn_down.fetch_add(1, Ordering::SeqCst);
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    struct FailingMountPlayer;

    impl PlayerBackend for FailingMountPlayer {
        fn mount(&mut self, _envelopes: &[Envelope]) -> DashcamResult<()> {
            Err(DashcamError::replay("backend unavailable"))
        }

        fn cast(&mut self, _envelope: &Envelope) {}

        fn teardown(&mut self) {}

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn canvas_envelope(timestamp: u64, indices: &[usize]) -> Envelope {
        let payload = CanvasSnapshotPayload {
            snapshots: indices
                .iter()
                .map(|&index| {
                    SurfaceSnapshot::new(
                        index,
                        100,
                        100,
                        "data:image/jpeg;base64,AAAA".to_string(),
                        format!("surface-{index}"),
                    )
                })
                .collect(),
            timestamp,
        };
        Envelope::canvas_snapshot(timestamp, &payload)
    }

    fn session_of(envelopes: Vec<Envelope>) -> Session {
        Session::from_envelopes(envelopes, SessionMeta::new("test"))
    }

    #[test]
    fn test_empty_session_reports_nothing_to_replay() {
        let registry = SharedSurfaceRegistry::new();
        let result = ReplayEngine::open(
            Box::new(RecordingPlayer::default()),
            session_of(vec![]),
            registry,
        );
        let err = result.err().unwrap();
        assert!(err.to_string().contains("nothing to replay"));
    }

    #[test]
    fn test_mount_failure_is_a_player_mount_status() {
        let registry = SharedSurfaceRegistry::new();
        let result = ReplayEngine::open(
            Box::new(FailingMountPlayer),
            session_of(vec![Envelope::custom(1, "marker", json!({}))]),
            registry,
        );
        assert!(matches!(
            result.err().unwrap(),
            DashcamError::PlayerMount { .. }
        ));
    }

    #[test]
    fn test_replay_restores_matching_surface_once_per_envelope() {
        let registry = SharedSurfaceRegistry::new();
        let (surface, restores) = CountingSurface::new("plot");
        registry.add(surface);

        let mut engine = ReplayEngine::open(
            Box::new(RecordingPlayer::default()),
            session_of(vec![
                Envelope::pointer_move(100, 0.1, 0.1, 1),
                canvas_envelope(200, &[0]),
                canvas_envelope(300, &[0]),
            ]),
            registry,
        )
        .unwrap();

        let stats = engine.run_to_end();
        assert_eq!(stats.cast, 3);
        assert_eq!(stats.canvas_envelopes, 2);
        assert_eq!(stats.surfaces_restored, 2);
        assert_eq!(stats.surfaces_skipped, 0);
        assert_eq!(restores.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_zero_surface_context_skips_without_raising() {
        let registry = SharedSurfaceRegistry::new();
        let mut engine = ReplayEngine::open(
            Box::new(RecordingPlayer::default()),
            session_of(vec![canvas_envelope(100, &[0])]),
            registry,
        )
        .unwrap();

        let stats = engine.run_to_end();
        assert_eq!(stats.surfaces_restored, 0);
        assert_eq!(stats.surfaces_skipped, 1);
    }

    #[test]
    fn test_failed_entry_does_not_abort_remaining_entries() {
        let registry = SharedSurfaceRegistry::new();
        registry.add(CountingSurface::failing("bad"));
        let (good, restores) = CountingSurface::new("good");
        registry.add(good);

        // One envelope carrying entries for index 0 (fails), 1 (works),
        // and 5 (out of range).
        let mut engine = ReplayEngine::open(
            Box::new(RecordingPlayer::default()),
            session_of(vec![canvas_envelope(100, &[0, 1, 5])]),
            registry,
        )
        .unwrap();

        let stats = engine.run_to_end();
        assert_eq!(stats.surfaces_restored, 1);
        assert_eq!(stats.surfaces_skipped, 2);
        assert_eq!(restores.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_controller_releases_previous_engine_on_open() {
        let torn_down = Arc::new(AtomicUsize::new(0));
        let registry = SharedSurfaceRegistry::new();
        let mut controller = ReplayController::new();

        let first = RecordingPlayer {
            torn_down: torn_down.clone(),
            ..RecordingPlayer::default()
        };
        controller
            .open(
                Box::new(first),
                session_of(vec![Envelope::custom(1, "marker", json!({}))]),
                registry.clone(),
            )
            .unwrap();
        assert!(controller.is_active());
        assert_eq!(torn_down.load(Ordering::SeqCst), 0);

        let second = RecordingPlayer {
            torn_down: torn_down.clone(),
            ..RecordingPlayer::default()
        };
        controller
            .open(
                Box::new(second),
                session_of(vec![Envelope::custom(2, "marker", json!({}))]),
                registry,
            )
            .unwrap();
        assert_eq!(torn_down.load(Ordering::SeqCst), 1);

        controller.close();
        assert_eq!(torn_down.load(Ordering::SeqCst), 2);
        assert!(!controller.is_active());
    }

    #[test]
    fn test_step_reports_remaining() {
        let registry = SharedSurfaceRegistry::new();
        let mut engine = ReplayEngine::open(
            Box::new(RecordingPlayer::default()),
            session_of(vec![
                Envelope::custom(1, "a", json!({})),
                Envelope::custom(2, "b", json!({})),
            ]),
            registry,
        )
        .unwrap();

        assert_eq!(engine.remaining(), 2);
        assert!(engine.step());
        assert_eq!(engine.remaining(), 1);
        assert!(!engine.step());
        assert_eq!(engine.remaining(), 0);
        assert!(!engine.step());
        assert_eq!(engine.stats().cast, 2);
    }
}
