//! All-or-nothing file writes.
//!
//! Content is staged in a temp file next to the target, flushed, synced and
//! renamed over the target. Readers observe either the old or the new file,
//! never a truncated one.

use std::fs as std_fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::IoError;

/// Atomically replace the contents of `path` with `bytes`.
///
/// Permissions of an existing target are carried over to the new file.
///
/// # Errors
/// Returns `IoError::System` when staging or syncing fails and
/// `IoError::Persist` when the final rename fails. The target is untouched
/// in both cases.
pub fn write_atomic<P: AsRef<Path>>(path: P, bytes: &[u8]) -> Result<(), IoError> {
    let path = path.as_ref();
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    let mut tmp = NamedTempFile::new_in(&parent)?;
    tmp.write_all(bytes)?;
    tmp.flush()?;
    if let Ok(metadata) = std_fs::metadata(path) {
        tmp.as_file().set_permissions(metadata.permissions())?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| IoError::Persist {
        path: path.to_string_lossy().to_string(),
        source: e.error,
    })?;

    tracing::debug!(path = %path.display(), bytes = bytes.len(), "replaced file atomically");
    Ok(())
}

/// Put `backup` back at `path` unless the file already holds exactly those
/// bytes.
///
/// Returns `true` when the file had to be rewritten.
///
/// # Errors
/// Returns `IoError::System` when the rewrite fails.
pub fn restore_bytes<P: AsRef<Path>>(path: P, backup: &[u8]) -> Result<bool, IoError> {
    let path = path.as_ref();
    if let Ok(current) = std_fs::read(path) {
        if current == backup {
            tracing::debug!(path = %path.display(), "file already matches backup");
            return Ok(false);
        }
    }
    write_atomic(path, backup)?;
    Ok(true)
}
