//! Error types for file I/O operations.
//!
//! Follows ODF-REP: Library crates use `thiserror` for explicit error enums.

use thiserror::Error;

/// Error types for exact reads and atomic writes.
#[derive(Error, Debug)]
pub enum IoError {
    /// File does not exist or cannot be stat'ed.
    #[error("File not found: {0}")]
    NotFound(String),

    /// File exceeds size limit.
    #[error("File too large: {0} bytes (limit: {1})")]
    TooLarge(u64, u64),

    /// File contains binary content (NULL bytes detected).
    #[error("Binary file detected")]
    BinaryFile,

    /// Content is not valid UTF-8; carries the offset of the first bad byte.
    #[error("UTF-8 decoding error at byte {0}")]
    Encoding(usize),

    /// The staged temp file could not be renamed over the target.
    #[error("Failed to replace {path}: {source}")]
    Persist {
        /// Target file.
        path: String,
        /// Rename failure.
        source: std::io::Error,
    },

    /// Low-level I/O error from std::io.
    #[error("IO error: {0}")]
    System(#[from] std::io::Error),
}
