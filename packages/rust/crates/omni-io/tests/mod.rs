//! Tests for omni-io crate.
//!
//! Integration tests for exact reads and atomic writes.

pub mod test_sync;
pub mod test_write;
