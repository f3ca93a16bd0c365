//! Full host surface — every call the host executor can make.
//!
//! [`FullSurface`] forwards the implemented operations to its [`TableOps`]
//! and answers the rest with fixed results: scans, ordered index walks,
//! truncation and renames are unsupported; informational hooks succeed
//! without effect.

use crate::engine::descriptor;
use crate::engine::handler::TableOps;
use crate::error::{LdbError, LdbResult};
use crate::schema::TableSchema;
use crate::transaction::lock::{ExternalLock, LockMode, StatementContext};
use crate::transaction::session::Session;
use tracing::debug;

/// Hints passed through `extra`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraHint {
    Normal,
    Quick,
    KeyRead,
    NoKeyRead,
    IgnoreDupKey,
    NoIgnoreDupKey,
    Other(i32),
}

fn unsupported<T>(operation: &'static str) -> LdbResult<T> {
    debug!(operation, "unsupported operation");
    Err(LdbError::UnsupportedOperation { operation })
}

/// Host-facing adapter around a [`TableOps`] implementation.
#[derive(Debug)]
pub struct FullSurface<T: TableOps> {
    inner: T,
}

impl<T: TableOps> FullSurface<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    // ════════════════════════════════════════════
    // Descriptor
    // ════════════════════════════════════════════

    pub fn table_type(&self) -> &'static str {
        descriptor::ENGINE_NAME
    }

    pub fn index_type(&self, _index: usize) -> &'static str {
        descriptor::INDEX_TYPE
    }

    /// File extensions owned by a table (`bas_ext`).
    pub fn bas_ext(&self) -> &'static [&'static str] {
        descriptor::FILE_EXTENSIONS
    }

    pub fn table_flags(&self) -> u64 {
        descriptor::table_flags()
    }

    pub fn index_flags(&self, _index: usize, _part: usize, _all_parts: bool) -> u64 {
        descriptor::index_flags()
    }

    pub fn max_supported_keys(&self) -> usize {
        descriptor::MAX_SUPPORTED_KEYS
    }

    pub fn max_supported_key_parts(&self) -> usize {
        descriptor::MAX_SUPPORTED_KEY_PARTS
    }

    pub fn max_supported_key_length(&self) -> usize {
        descriptor::MAX_KEY_LENGTH
    }

    pub fn max_supported_record_length(&self) -> usize {
        descriptor::MAX_RECORD_LENGTH
    }

    /// Row counts are never reported to the host, so a scan costs the base estimate.
    pub fn scan_time(&self) -> f64 {
        descriptor::scan_time(0, 0)
    }

    pub fn read_time(&self, _index: usize, _ranges: usize, rows: u64) -> f64 {
        descriptor::read_time(rows)
    }

    pub fn records_in_range(&self, _index: usize, _min_key: Option<&[u8]>, _max_key: Option<&[u8]>) -> u64 {
        descriptor::RECORDS_IN_RANGE_ESTIMATE
    }

    // ════════════════════════════════════════════
    // Implemented operations
    // ════════════════════════════════════════════

    pub fn open(&mut self, name: &str, schema: &TableSchema) -> LdbResult<()> {
        self.inner.open(name, schema)
    }

    pub fn close(&mut self) -> LdbResult<()> {
        self.inner.close()
    }

    pub fn create(&mut self, name: &str, schema: &TableSchema) -> LdbResult<()> {
        self.inner.create(name, schema)
    }

    pub fn delete_table(&mut self, name: &str) -> LdbResult<()> {
        self.inner.delete_table(name)
    }

    pub fn write_row(&mut self, session: &mut Session, row: &[u8]) -> LdbResult<()> {
        self.inner.write_row(session, row)
    }

    pub fn update_row(&mut self, session: &mut Session, old_row: &[u8], new_row: &[u8]) -> LdbResult<()> {
        self.inner.update_row(session, old_row, new_row)
    }

    pub fn delete_row(&mut self, session: &mut Session, row: &[u8]) -> LdbResult<()> {
        self.inner.delete_row(session, row)
    }

    pub fn point_lookup(&self, key: &[u8]) -> LdbResult<Vec<u8>> {
        self.inner.point_lookup(key)
    }

    pub fn index_read(&self, key_buffer: &[u8]) -> LdbResult<Vec<u8>> {
        self.inner.index_read(key_buffer)
    }

    pub fn store_lock(&mut self, requested: LockMode, statement: &StatementContext) -> LockMode {
        self.inner.store_lock(requested, statement)
    }

    pub fn external_lock(&mut self, session: &mut Session, lock: ExternalLock) -> LdbResult<()> {
        self.inner.external_lock(session, lock)
    }

    /// Raw lock code variant of [`FullSurface::external_lock`].
    pub fn external_lock_raw(&mut self, session: &mut Session, lock: i32) -> LdbResult<()> {
        let lock = ExternalLock::try_from(lock)?;
        self.inner.external_lock(session, lock)
    }

    /// Keys are unique; a point read never has a successor.
    pub fn index_next(&mut self) -> LdbResult<Vec<u8>> {
        Err(LdbError::NotFound)
    }

    // ════════════════════════════════════════════
    // No-op hooks
    // ════════════════════════════════════════════

    pub fn info(&mut self, _flag: u32) -> LdbResult<()> {
        Ok(())
    }

    pub fn extra(&mut self, _hint: ExtraHint) -> LdbResult<()> {
        Ok(())
    }

    /// Remember the current row position; positions are never read back.
    pub fn position(&mut self, _row: &[u8]) {}

    // ════════════════════════════════════════════
    // Unsupported operations
    // ════════════════════════════════════════════

    pub fn rnd_init(&mut self, _scan: bool) -> LdbResult<()> {
        unsupported("rnd_init")
    }

    pub fn rnd_end(&mut self) -> LdbResult<()> {
        unsupported("rnd_end")
    }

    pub fn rnd_next(&mut self) -> LdbResult<Vec<u8>> {
        unsupported("rnd_next")
    }

    pub fn rnd_pos(&mut self, _position: &[u8]) -> LdbResult<Vec<u8>> {
        unsupported("rnd_pos")
    }

    pub fn index_prev(&mut self) -> LdbResult<Vec<u8>> {
        unsupported("index_prev")
    }

    pub fn index_first(&mut self) -> LdbResult<Vec<u8>> {
        unsupported("index_first")
    }

    pub fn index_last(&mut self) -> LdbResult<Vec<u8>> {
        unsupported("index_last")
    }

    pub fn delete_all_rows(&mut self) -> LdbResult<()> {
        unsupported("delete_all_rows")
    }

    pub fn truncate(&mut self) -> LdbResult<()> {
        unsupported("truncate")
    }

    pub fn rename_table(&mut self, _from: &str, _to: &str) -> LdbResult<()> {
        unsupported("rename_table")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::plugin::Engine;
    use crate::error::codes;

    #[test]
    fn descriptor_values() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::init(EngineConfig::new(dir.path())).unwrap();
        let surface = engine.surface();

        assert_eq!(surface.table_type(), "LEVELDB");
        assert_eq!(surface.index_type(0), "HASH");
        assert!(surface.bas_ext().is_empty());
        assert_eq!(surface.max_supported_keys(), 1);
        assert_eq!(surface.max_supported_key_parts(), 1);
        assert_eq!(surface.max_supported_key_length(), 3500);
        assert_eq!(surface.records_in_range(0, None, None), 10);
        assert_eq!(surface.scan_time(), 10.0);
        assert_eq!(surface.read_time(0, 1, 20), 2.0);
    }

    #[test]
    fn unsupported_without_open_table() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::init(EngineConfig::new(dir.path())).unwrap();
        let mut surface = engine.surface();

        let results = [
            surface.rnd_init(true).map(|_| ()),
            surface.rnd_next().map(|_| ()),
            surface.rnd_pos(b"x").map(|_| ()),
            surface.rnd_end(),
            surface.index_prev().map(|_| ()),
            surface.index_first().map(|_| ()),
            surface.index_last().map(|_| ()),
            surface.delete_all_rows(),
            surface.truncate(),
            surface.rename_table("a", "b"),
        ];
        for result in results {
            let err = result.unwrap_err();
            assert!(err.is_unsupported());
            assert_eq!(err.handler_code(), codes::HA_ERR_WRONG_COMMAND);
        }
        assert_eq!(
            surface.index_next().unwrap_err().handler_code(),
            codes::HA_ERR_END_OF_FILE
        );
        assert!(surface.info(0).is_ok());
        assert!(surface.extra(ExtraHint::Quick).is_ok());
    }

    #[test]
    fn raw_lock_code_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Engine::init(EngineConfig::new(dir.path())).unwrap();
        let mut surface = engine.surface();
        let mut session = engine.new_session();
        assert!(matches!(
            surface.external_lock_raw(&mut session, 5),
            Err(LdbError::Protocol(_))
        ));
    }
}
