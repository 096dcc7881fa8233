//! Show the transport delivery decision for a document.

use std::path::PathBuf;

use dashcam_common::AppConfig;
use dashcam_session_model::{document, SerializedSession, Session, SessionMeta};
use dashcam_transport::{route, ChannelLimits, Delivery};

pub fn run(path: PathBuf, ceiling: Option<usize>) -> anyhow::Result<()> {
    let raw = super::read_document(&path)?;
    let envelopes = document::parse_document(&raw)
        .map_err(|e| anyhow::anyhow!("Failed to parse session document: {e}"))?;

    let session = Session::from_envelopes(envelopes, SessionMeta::new(path.display().to_string()));
    let serialized = SerializedSession {
        size_bytes: raw.len(),
        json: raw,
    };

    let limits = match ceiling {
        Some(bytes) => ChannelLimits::new(bytes),
        None => {
            let app_config = AppConfig::load();
            ChannelLimits::from_env_or(app_config.transport.max_message_bytes)
        }
    };

    println!("Document: {}", path.display());
    println!("  Size: {} bytes", serialized.size_bytes);
    println!("  Channel ceiling: {} bytes", limits.max_message_bytes);
    println!();

    match route(&session, &serialized, limits) {
        Delivery::Inline { summary } => {
            println!("Decision: inline, the document may cross the realtime channel.");
            println!("  Summary: {}", summary.display_line());
        }
        Delivery::SideChannel { summary } => {
            println!("Decision: side-channel, the document stays local.");
            println!("  Channel payload (summary only): {}", summary.display_line());
        }
    }

    Ok(())
}
