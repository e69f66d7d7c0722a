//! Output path policy and atomic file writes.

use crate::config::OutputLocation;
use crate::error::StampError;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Output path used by single-file mode when none is given:
/// `<prefix><basename>` beside the input or in the working directory.
pub fn default_output_path(
    input: &Path,
    location: OutputLocation,
    prefix: &str,
) -> Result<PathBuf, StampError> {
    let name = input.file_name().ok_or_else(|| {
        StampError::Usage(format!("'{}' does not name a file", input.display()))
    })?;

    let mut file_name = std::ffi::OsString::from(prefix);
    file_name.push(name);

    Ok(match location {
        OutputLocation::InputDir => match input.parent() {
            Some(parent) => parent.join(file_name),
            None => PathBuf::from(file_name),
        },
        OutputLocation::CurrentDir => PathBuf::from(file_name),
    })
}

/// Write `data` to `path` through a temporary sibling file and a rename,
/// so a failed write never leaves a truncated image at `path`.
///
/// An existing file at `path` is replaced.
pub async fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StampError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| StampError::Usage(format!("'{}' does not name a file", path.display())))?
        .to_string_lossy();
    let temp_name = format!(".{}.{}.tmp", file_name, Uuid::new_v4().simple());
    let temp_path = match path.parent() {
        Some(parent) => parent.join(temp_name),
        None => PathBuf::from(temp_name),
    };

    if let Err(e) = tokio::fs::write(&temp_path, data).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(StampError::io(path, e));
    }

    if let Err(e) = tokio::fs::rename(&temp_path, path).await {
        let _ = tokio::fs::remove_file(&temp_path).await;
        return Err(StampError::io(path, e));
    }

    Ok(())
}
