//! Replay a session document against in-memory surfaces.

use std::collections::BTreeMap;
use std::path::PathBuf;

use dashcam_capture::SharedSurfaceRegistry;
use dashcam_common::{AppConfig, DashcamError};
use dashcam_replay::{LoggingPlayer, ReplayController};
use dashcam_session_model::Session;
use dashcam_transport::{ChannelLimits, SessionStage};

use crate::surfaces::MemorySurface;

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    let raw = super::read_document(&path)?;
    let app_config = AppConfig::load();
    let limits = ChannelLimits::from_env_or(app_config.transport.max_message_bytes);

    // Stage the upload the way a live host would: validate once, keep
    // the envelopes local, report only the receipt upstream.
    let mut stage = SessionStage::new(limits);
    let receipt = match stage.accept(&raw, path.display().to_string()) {
        Ok(receipt) => receipt,
        Err(DashcamError::MalformedDocument { message }) => {
            println!("Status: malformed session file ({message})");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    println!("Staged upload: {}", receipt.summary.display_line());

    let session = stage
        .take()
        .ok_or_else(|| anyhow::anyhow!("staged session disappeared"))?;

    let registry = build_replay_surfaces(&session);
    println!("Replay surfaces: {}", registry.len());

    let mut controller = ReplayController::new();
    match controller.open(Box::new(LoggingPlayer::new()), session, registry) {
        Ok(()) => {}
        Err(e @ (DashcamError::Replay { .. } | DashcamError::PlayerMount { .. })) => {
            println!("Status: {e}");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    }

    let stats = controller
        .engine_mut()
        .map(|engine| engine.run_to_end())
        .unwrap_or_default();
    controller.close();

    println!();
    println!("Replay finished:");
    println!("  Envelopes cast: {}", stats.cast);
    println!("  Canvas envelopes: {}", stats.canvas_envelopes);
    println!("  Surfaces restored: {}", stats.surfaces_restored);
    println!("  Entries skipped: {}", stats.surfaces_skipped);

    Ok(())
}

/// Build one blank surface per recorded index, sized from the first
/// snapshot entry seen for that index.
fn build_replay_surfaces(session: &Session) -> SharedSurfaceRegistry {
    let mut seen: BTreeMap<usize, (String, u32, u32)> = BTreeMap::new();
    for payload in session.envelopes().iter().filter_map(|e| e.as_canvas_snapshot()) {
        for entry in payload.snapshots {
            seen.entry(entry.index)
                .or_insert((entry.id, entry.width, entry.height));
        }
    }

    let registry = SharedSurfaceRegistry::new();
    let surface_count = seen.keys().next_back().map(|max| max + 1).unwrap_or(0);
    for index in 0..surface_count {
        let (id, width, height) = seen
            .get(&index)
            .cloned()
            .unwrap_or_else(|| (format!("surface-{index}"), 1, 1));
        registry.add(Box::new(MemorySurface::blank(id, width, height)));
    }
    registry
}
