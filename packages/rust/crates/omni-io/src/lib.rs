#![allow(clippy::doc_markdown)]

//! omni-io - Safe and exact file I/O for Omni DevEnv
//!
//! Byte-exact reads and all-or-nothing writes for tools that rewrite source
//! files in place.
//!
//! # Features
//!
//! - **Safety**: Binary detection & Size limits on read
//! - **Exactness**: Reads return the untouched bytes, decoding is strict
//! - **Atomicity**: Writes go to a sibling temp file that is synced and renamed
//!
//! # Architecture (ODF-REP Compliant)
//!
//! ```text
//! omni-io/src/
//! ├── lib.rs      # Re-exports (this file)
//! ├── error.rs    # IoError enum
//! ├── detect.rs   # Binary detection & decoding
//! ├── sync.rs     # Size-limited reads
//! └── write.rs    # Atomic writes and restores
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use omni_io::{read_bytes_safe, write_atomic, IoError};
//!
//! let original = read_bytes_safe("config.go", 1024 * 1024)?;
//! write_atomic("config.go", b"package config\n")?;
//! ```

// ============================================================================
// Module Declarations (ODF-REP: Atomic Structure)
// ============================================================================

mod detect;
mod error;
mod sync;
mod write;

// ============================================================================
// Public Re-exports
// ============================================================================

pub use error::IoError;
pub use sync::read_bytes_safe;
pub use write::{restore_bytes, write_atomic};

// Re-export detection utilities for advanced use
pub use detect::{decode_buffer, is_binary};
