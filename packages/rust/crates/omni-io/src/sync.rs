//! Synchronous, size-limited file reads.

use std::fs as std_fs;
use std::io::Read;
use std::path::Path;

use crate::detect::is_binary;
use crate::error::IoError;

/// Read the raw bytes of a file with size and binary checks.
///
/// The returned buffer is exactly what is on disk, which makes it usable as
/// a restore point.
///
/// # Arguments
/// * `path` - Path to the file
/// * `max_bytes` - Maximum file size in bytes
///
/// # Errors
/// `IoError::NotFound` when the file cannot be stat'ed, `IoError::TooLarge`
/// above the limit, `IoError::BinaryFile` for binary content.
pub fn read_bytes_safe<P: AsRef<Path>>(path: P, max_bytes: u64) -> Result<Vec<u8>, IoError> {
    let path = path.as_ref();

    let metadata = std_fs::metadata(path)
        .map_err(|_| IoError::NotFound(path.to_string_lossy().to_string()))?;

    if metadata.len() > max_bytes {
        return Err(IoError::TooLarge(metadata.len(), max_bytes));
    }

    let mut file = std_fs::File::open(path)?;
    let mut buffer = Vec::with_capacity(usize::try_from(metadata.len()).unwrap_or_default());
    file.read_to_end(&mut buffer)?;

    if is_binary(&buffer) {
        return Err(IoError::BinaryFile);
    }

    tracing::trace!(path = %path.display(), bytes = buffer.len(), "read file");
    Ok(buffer)
}
