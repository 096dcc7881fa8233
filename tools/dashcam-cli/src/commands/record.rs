//! Record a synthetic demo session.
//!
//! Stands in for a browser host: scripted pointer/click/scroll
//! envelopes play the role of the external recorder's emit callback
//! while the sampler captures real encoded test-pattern surfaces.

use std::path::{Path, PathBuf};
use std::time::Duration;

use dashcam_capture::{CaptureConfig, CaptureSession, ImageFormat, SamplerConfig};
use dashcam_common::AppConfig;
use dashcam_session_model::{document, Envelope, MouseInteractionKind};
use dashcam_transport::{route, ChannelLimits, Delivery};
use serde_json::json;

use crate::surfaces::MemorySurface;

pub async fn run(
    output: PathBuf,
    duration_secs: f64,
    surfaces: usize,
    interval_ms: Option<u64>,
    quality: Option<f64>,
) -> anyhow::Result<()> {
    let app_config = AppConfig::load();
    let output = resolve_output_path(&app_config.sessions_dir, output);
    let interval_ms = interval_ms.unwrap_or(app_config.capture.snapshot_interval_ms);
    let quality = quality.unwrap_or(app_config.capture.snapshot_quality);
    let format = ImageFormat::from_name(&app_config.capture.snapshot_format)
        .unwrap_or(ImageFormat::Jpeg);

    println!("Recording synthetic demo session");
    println!("  Output: {}", output.display());
    println!("  Duration: {duration_secs:.1}s");
    println!("  Surfaces: {surfaces}");
    println!("  Snapshot interval: {interval_ms}ms @ quality {quality:.2}");
    println!();

    let mut session = CaptureSession::new(CaptureConfig {
        origin: "dashcam-cli demo".to_string(),
        sampler: SamplerConfig {
            interval: Duration::from_millis(interval_ms.max(1)),
            quality,
            format,
        },
    });

    for i in 0..surfaces {
        session.register_surface(Box::new(MemorySurface::test_pattern(
            format!("demo-canvas-{i}"),
            640,
            480,
        )));
    }

    session.start();
    let clock = session
        .clock()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("session clock missing after start"))?;
    let emitter = session.emitter();

    // Script the generic event stream the way a browser recorder would
    // emit it: one meta + full snapshot up front, then pointer motion
    // with occasional clicks and scrolls.
    emitter.emit(Envelope::meta(
        clock.now_ms(),
        "demo://dashboard",
        1280,
        720,
    ));
    emitter.emit(Envelope::full_snapshot(
        clock.now_ms(),
        json!({ "id": 1, "childNodes": [] }),
    ));

    let steps = (duration_secs.max(0.1) * 20.0) as u64;
    for step in 0..steps {
        let angle = step as f64 / 20.0;
        let x = 0.5 + 0.4 * angle.cos();
        let y = 0.5 + 0.4 * angle.sin();
        emitter.emit(Envelope::pointer_move(clock.now_ms(), x, y, 7));

        if step % 10 == 5 {
            emitter.emit(Envelope::mouse_interaction(
                clock.now_ms(),
                MouseInteractionKind::Click,
                7,
                x,
                y,
            ));
        }
        if step % 7 == 3 {
            emitter.emit(Envelope::scroll(clock.now_ms(), 7, 0.0, 24.0));
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    let frozen = match session.stop().await.into_session() {
        Some(frozen) => frozen,
        None => anyhow::bail!("recording stopped unexpectedly"),
    };

    println!(
        "Captured {} envelopes ({} canvas) over {:.1}s",
        frozen.len(),
        frozen.canvas_envelope_count(),
        frozen.duration_ms() as f64 / 1000.0
    );

    let serialized = document::serialize(&frozen)?;
    let limits = ChannelLimits::from_env_or(app_config.transport.max_message_bytes);
    let delivery = route(&frozen, &serialized, limits);

    match &delivery {
        Delivery::Inline { summary } => {
            println!(
                "Delivery: inline ({} bytes < {} byte ceiling)",
                summary.size_bytes, limits.max_message_bytes
            );
        }
        Delivery::SideChannel { summary } => {
            println!(
                "Delivery: side-channel only; channel payload limited to summary: {}",
                summary.display_line()
            );
        }
    }

    // The CLI's side channel is the filesystem; save in both cases so
    // the document is inspectable.
    document::save_document(&serialized, &output)?;
    println!("Session saved to: {}", output.display());

    Ok(())
}

/// A bare file name lands in the configured sessions directory; any
/// path carrying a directory component is used as given.
fn resolve_output_path(sessions_dir: &Path, output: PathBuf) -> PathBuf {
    let has_dir = output.is_absolute()
        || output.parent().is_some_and(|p| !p.as_os_str().is_empty());
    if has_dir {
        output
    } else {
        sessions_dir.join(output)
    }
}
