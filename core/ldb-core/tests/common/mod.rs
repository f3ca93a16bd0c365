// Shared fixtures for the integration tests.

#![allow(dead_code)]

use ldb_core::{Engine, EngineConfig, KeyPart, KeyType, TableSchema};
use std::sync::Arc;
use tempfile::TempDir;

/// Bytes in every test row.
pub const RECORD_LENGTH: usize = 64;
/// Data bytes of the key column (after its 1-byte length prefix).
pub const KEY_LENGTH: usize = 16;

/// Engine rooted in a fresh temporary directory.
pub fn engine() -> (TempDir, Arc<Engine>) {
    ldb_core::logging::init_test();
    let dir = tempfile::tempdir().unwrap();
    let engine = Engine::init(EngineConfig::new(dir.path()).with_sync_writes(false)).unwrap();
    (dir, engine)
}

/// `name VARCHAR(16)` key at offset 0, then a free-form payload.
pub fn schema() -> TableSchema {
    TableSchema::single_key(
        RECORD_LENGTH,
        KeyPart::new("name", 0, KEY_LENGTH, KeyType::VarText1),
    )
}

/// Row with `name` as key and `payload` after the key column.
pub fn make_row(name: &str, payload: &[u8]) -> Vec<u8> {
    assert!(name.len() <= KEY_LENGTH);
    let mut row = vec![0u8; RECORD_LENGTH];
    row[0] = name.len() as u8;
    row[1..1 + name.len()].copy_from_slice(name.as_bytes());
    let start = 1 + KEY_LENGTH;
    let n = payload.len().min(RECORD_LENGTH - start);
    row[start..start + n].copy_from_slice(&payload[..n]);
    row
}

/// Store key of the row built by [`make_row`] for `name`.
pub fn key_of(name: &str) -> Vec<u8> {
    let mut key = vec![0u8; KEY_LENGTH];
    key[..name.len()].copy_from_slice(name.as_bytes());
    key
}
