//! Tests for sync module - size-limited reads.

use std::io::Write;
use tempfile::TempDir;

use omni_io::{IoError, decode_buffer, read_bytes_safe};

#[test]
fn test_sync_read() {
    let dir = TempDir::new().unwrap();
    let p = dir.path().join("config.go");
    std::fs::write(&p, "package config\n").unwrap();
    let bytes = read_bytes_safe(&p, 1024).unwrap();
    assert_eq!(decode_buffer(bytes).unwrap(), "package config\n");
}

#[test]
fn test_sync_binary() {
    let dir = TempDir::new().unwrap();
    let p = dir.path().join("binary.bin");
    let mut file = std::fs::File::create(&p).unwrap();
    file.write_all(b"\x00\x01\x02\x03").unwrap();
    assert!(matches!(read_bytes_safe(&p, 1024), Err(IoError::BinaryFile)));
}

#[test]
fn test_file_too_large() {
    let dir = TempDir::new().unwrap();
    let p = dir.path().join("large.txt");
    std::fs::write(&p, "12345678901234567890").unwrap();
    assert!(matches!(
        read_bytes_safe(&p, 10),
        Err(IoError::TooLarge(_, _))
    ));
}

#[test]
fn test_file_not_found() {
    let result = read_bytes_safe("/nonexistent/file.go", 1024);
    assert!(matches!(result, Err(IoError::NotFound(_))));
}
