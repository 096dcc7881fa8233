use std::path::Path;

use dashcam_common::{DashcamError, DashcamResult};

pub mod gate;
pub mod inspect;
pub mod record;
pub mod replay;
pub mod validate;

/// Read a session document file, distinguishing a missing file from
/// other read failures.
pub(crate) fn read_document(path: &Path) -> DashcamResult<String> {
    if !path.exists() {
        return Err(DashcamError::file_not_found(path));
    }
    Ok(std::fs::read_to_string(path)?)
}
