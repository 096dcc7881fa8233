//! Validate a session document upload.

use std::path::PathBuf;

use dashcam_common::{AppConfig, DashcamError};
use dashcam_transport::{ChannelLimits, SessionStage};

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating session document: {}", path.display());

    let raw = super::read_document(&path)?;
    let app_config = AppConfig::load();
    let limits = ChannelLimits::from_env_or(app_config.transport.max_message_bytes);
    let mut stage = SessionStage::new(limits);

    match stage.accept(&raw, path.display().to_string()) {
        Ok(receipt) => {
            println!("  Items: {}", receipt.item_count);
            println!("  Summary: {}", receipt.summary.display_line());
            println!("  Delivery under {} byte ceiling: {:?}", limits.max_message_bytes, receipt.delivery);
            println!("\nDocument is a well-formed session.");
        }
        Err(DashcamError::MalformedDocument { message }) => {
            // A user-visible status, not a crash.
            println!("\nStatus: malformed session file ({message})");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
