//! Tests for write module - atomic replace and restore.

use tempfile::TempDir;

use omni_io::{read_bytes_safe, restore_bytes, write_atomic};

#[test]
fn test_write_then_restore_round_trip() {
    let dir = TempDir::new().unwrap();
    let p = dir.path().join("config.go");
    let original = b"package config\n\ntype Config struct{}\n";
    std::fs::write(&p, original).unwrap();

    let backup = read_bytes_safe(&p, 1024).unwrap();
    write_atomic(&p, b"package config\n").unwrap();
    assert_eq!(std::fs::read(&p).unwrap(), b"package config\n");

    assert!(restore_bytes(&p, &backup).unwrap());
    assert_eq!(std::fs::read(&p).unwrap(), original);
}

#[test]
fn test_write_creates_missing_file() {
    let dir = TempDir::new().unwrap();
    let p = dir.path().join("new.go");
    write_atomic(&p, b"package fresh\n").unwrap();
    assert_eq!(std::fs::read(&p).unwrap(), b"package fresh\n");
}

#[cfg(unix)]
#[test]
fn test_write_preserves_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let p = dir.path().join("config.go");
    std::fs::write(&p, "package config\n").unwrap();
    std::fs::set_permissions(&p, std::fs::Permissions::from_mode(0o644)).unwrap();

    write_atomic(&p, b"package config\n\n").unwrap();

    let mode = std::fs::metadata(&p).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o644);
}
