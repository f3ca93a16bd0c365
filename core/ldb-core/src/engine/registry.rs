//! Table registry — at most one open store per table name.
//!
//! All lookups, inserts, use-count changes and removals happen under one
//! registry mutex. The only store I/O performed while holding it is opening
//! a missing table and closing a table whose count reached zero, so two
//! sessions can never open the same store twice.

use crate::engine::handle::TableHandle;
use crate::engine::status::EngineStatus;
use crate::error::{LdbError, LdbResult};
use crate::storage::store::{KvStore, StoreOptions};
use ahash::AHashMap;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, instrument, warn};

/// Name-keyed map of open tables.
#[derive(Debug)]
pub struct TableRegistry {
    tables: Mutex<AHashMap<String, Arc<TableHandle>>>,
    status: Arc<EngineStatus>,
    running: AtomicBool,
}

impl TableRegistry {
    /// Create an empty, running registry.
    pub fn init(status: Arc<EngineStatus>) -> Self {
        Self {
            tables: Mutex::new(AHashMap::new()),
            status,
            running: AtomicBool::new(true),
        }
    }

    /// Return the handle for `name`, opening its store on first use.
    ///
    /// The store must already exist; creation happens only through the
    /// handler's `create`. On failure nothing is registered.
    #[instrument(skip(self, path, options), fields(path = %path.display()))]
    pub fn get_or_create(
        &self,
        name: &str,
        path: &Path,
        options: &StoreOptions,
    ) -> LdbResult<Arc<TableHandle>> {
        let mut tables = self.tables.lock();
        // shutdown flips this under the same lock
        if !self.running.load(Ordering::Acquire) {
            return Err(LdbError::Protocol("table registry is shut down".to_string()));
        }
        if let Some(handle) = tables.get(name) {
            let count = handle.retain();
            debug!(count, "table handle shared");
            return Ok(Arc::clone(handle));
        }

        let store = KvStore::open_or_create(path, false, options)?;
        self.status.record_store_open();

        let handle = Arc::new(TableHandle::new(
            name.to_string(),
            path.to_path_buf(),
            store,
            self.status.table(name),
        ));
        handle.retain();
        tables.insert(name.to_string(), Arc::clone(&handle));
        info!("table handle created");
        Ok(handle)
    }

    /// Drop one use of `handle`; closes its store when unused.
    #[instrument(skip(self, handle), fields(table = handle.name()))]
    pub fn release(&self, handle: &Arc<TableHandle>) -> LdbResult<()> {
        let mut tables = self.tables.lock();
        let registered = tables
            .get(handle.name())
            .is_some_and(|current| Arc::ptr_eq(current, handle));
        if !registered {
            return Err(LdbError::Protocol(format!(
                "handle for table '{}' is not registered",
                handle.name()
            )));
        }

        let remaining = handle.unretain()?;
        if remaining > 0 {
            debug!(remaining, "table handle released");
            return Ok(());
        }

        tables.remove(handle.name());
        handle.close_store()?;
        self.status.record_store_close();
        info!("table handle destroyed");
        Ok(())
    }

    /// Registered handle for `name`, without taking a use.
    pub fn lookup(&self, name: &str) -> Option<Arc<TableHandle>> {
        self.tables.lock().get(name).cloned()
    }

    /// `(name, use count)` of every open table, sorted by name.
    pub fn open_tables(&self) -> Vec<(String, usize)> {
        let mut open: Vec<(String, usize)> = self
            .tables
            .lock()
            .values()
            .map(|handle| (handle.name().to_string(), handle.use_count()))
            .collect();
        open.sort();
        open
    }

    pub fn len(&self) -> usize {
        self.tables.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.lock().is_empty()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stop accepting opens. Fails, leaving every handle intact, while any
    /// table is still open.
    pub fn shutdown(&self) -> LdbResult<()> {
        let tables = self.tables.lock();
        if !tables.is_empty() {
            let mut names: Vec<String> = tables.keys().cloned().collect();
            names.sort();
            warn!(tables = ?names, "shutdown refused while tables are open");
            return Err(LdbError::RegistryBusy { tables: names });
        }
        self.running.store(false, Ordering::Release);
        info!("table registry shut down");
        Ok(())
    }
}
