//! Table handle — the shared per-table state behind every open handler.
//!
//! One handle exists per open table name. It owns the table's store while
//! its use count is above zero; the registry takes the store out and closes
//! it when the last user releases the handle.

use crate::engine::status::TableStats;
use crate::error::{LdbError, LdbResult};
use crate::storage::batch::WriteBatch;
use crate::storage::store::KvStore;
use crate::transaction::lock::{ExternalLock, TableLock};
use parking_lot::{Mutex, RwLock};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error};

/// Fields guarded by the handle mutex.
#[derive(Debug, Default)]
struct HandleState {
    use_count: usize,
    lock: TableLock,
}

/// Shared state of one open table.
#[derive(Debug)]
pub struct TableHandle {
    name: String,
    path: PathBuf,
    /// `None` once the registry has closed the store
    store: RwLock<Option<KvStore>>,
    state: Mutex<HandleState>,
    stats: Arc<TableStats>,
}

impl TableHandle {
    /// Wrap an open store. The use count starts at zero.
    pub(crate) fn new(name: String, path: PathBuf, store: KvStore, stats: Arc<TableStats>) -> Self {
        Self {
            name,
            path,
            store: RwLock::new(Some(store)),
            state: Mutex::new(HandleState::default()),
            stats,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn stats(&self) -> &Arc<TableStats> {
        &self.stats
    }

    pub fn use_count(&self) -> usize {
        self.state.lock().use_count
    }

    /// Copy of the table-level lock descriptor.
    pub fn table_lock(&self) -> TableLock {
        self.state.lock().lock
    }

    pub fn is_open(&self) -> bool {
        self.store.read().is_some()
    }

    pub(crate) fn retain(&self) -> usize {
        let mut state = self.state.lock();
        state.use_count += 1;
        state.use_count
    }

    /// Drop one use; returns the remaining count.
    pub(crate) fn unretain(&self) -> LdbResult<usize> {
        let mut state = self.state.lock();
        if state.use_count == 0 {
            return Err(LdbError::Protocol(format!(
                "table '{}' released more often than opened",
                self.name
            )));
        }
        state.use_count -= 1;
        Ok(state.use_count)
    }

    pub(crate) fn acquire_lock(&self, lock: ExternalLock) {
        self.state.lock().lock.acquire(lock);
    }

    pub(crate) fn release_lock(&self, lock: ExternalLock) {
        self.state.lock().lock.release(lock);
    }

    /// Committed value for `key`.
    pub fn get(&self, key: &[u8]) -> LdbResult<Option<Vec<u8>>> {
        let store = self.store.read();
        let store = store
            .as_ref()
            .ok_or_else(|| LdbError::TableNotOpen(self.name.clone()))?;
        store.get(key)
    }

    /// Apply `batch` atomically to the table's store.
    pub fn commit(&self, batch: WriteBatch) -> LdbResult<()> {
        let (puts, deletes) = batch.counts();
        let result = match self.store.read().as_ref() {
            Some(store) => store.write(batch),
            None => Err(LdbError::StoreWrite(format!(
                "store of table '{}' is closed",
                self.name
            ))),
        };

        match result {
            Ok(()) => {
                self.stats.record_commit(puts, deletes);
                debug!(table = %self.name, puts, deletes, "batch committed");
                Ok(())
            }
            Err(e) => {
                self.stats.record_commit_failure();
                error!(table = %self.name, error = %e, "batch commit failed");
                Err(match e {
                    LdbError::StoreWrite(_) => e,
                    other => LdbError::StoreWrite(other.to_string()),
                })
            }
        }
    }

    /// Take the store out of the handle and close it.
    pub(crate) fn close_store(&self) -> LdbResult<()> {
        match self.store.write().take() {
            Some(store) => store.close(),
            None => Ok(()),
        }
    }
}
