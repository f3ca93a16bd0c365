//! Handler facade — the row-level operations a query executor calls.
//!
//! A [`TableHandler`] is one executor-side cursor on one table. Reads go
//! straight to the table's store; writes are appended to the calling
//! session's transaction and only reach the store when the session releases
//! its lock on the table.

use crate::engine::handle::TableHandle;
use crate::engine::plugin::Engine;
use crate::error::{LdbError, LdbResult};
use crate::schema::TableSchema;
use crate::storage::key_codec::{derive_key, strip_key_buffer};
use crate::storage::store::KvStore;
use crate::storage::value_codec::ValueCodec;
use crate::transaction::lock::{ExternalLock, LockData, LockMode, StatementContext, negotiate};
use crate::transaction::session::{Session, Transaction};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Operations this engine actually implements.
///
/// Everything else the host may call is answered by
/// [`FullSurface`](crate::engine::surface::FullSurface).
pub trait TableOps {
    /// Attach to an existing table.
    fn open(&mut self, name: &str, schema: &TableSchema) -> LdbResult<()>;

    /// Detach from the table opened by [`TableOps::open`].
    fn close(&mut self) -> LdbResult<()>;

    /// Create the on-disk store for a new table.
    fn create(&mut self, name: &str, schema: &TableSchema) -> LdbResult<()>;

    /// Destroy a table's on-disk store.
    fn delete_table(&mut self, name: &str) -> LdbResult<()>;

    fn write_row(&mut self, session: &mut Session, row: &[u8]) -> LdbResult<()>;

    fn update_row(&mut self, session: &mut Session, old_row: &[u8], new_row: &[u8]) -> LdbResult<()>;

    fn delete_row(&mut self, session: &mut Session, row: &[u8]) -> LdbResult<()>;

    /// Committed row stored under `key`.
    fn point_lookup(&self, key: &[u8]) -> LdbResult<Vec<u8>>;

    /// Point lookup with a host key buffer.
    fn index_read(&self, key_buffer: &[u8]) -> LdbResult<Vec<u8>>;

    /// Negotiate the table-level lock mode for a statement.
    fn store_lock(&mut self, requested: LockMode, statement: &StatementContext) -> LockMode;

    /// Acquire or release the session's lock on the table.
    fn external_lock(&mut self, session: &mut Session, lock: ExternalLock) -> LdbResult<()>;
}

/// Handler bound to one engine and, once opened, one table.
#[derive(Debug)]
pub struct TableHandler {
    engine: Arc<Engine>,
    share: Option<Arc<TableHandle>>,
    schema: Option<TableSchema>,
    lock_data: LockData,
    /// Acquisitions not yet released through this handler
    held: Vec<ExternalLock>,
}

impl TableHandler {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self {
            engine,
            share: None,
            schema: None,
            lock_data: LockData::default(),
            held: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.share.is_some()
    }

    /// Name of the open table.
    pub fn table_name(&self) -> Option<&str> {
        self.share.as_deref().map(TableHandle::name)
    }

    pub fn share(&self) -> Option<&Arc<TableHandle>> {
        self.share.as_ref()
    }

    pub fn schema(&self) -> Option<&TableSchema> {
        self.schema.as_ref()
    }

    /// Mode recorded by the last [`TableOps::store_lock`].
    pub fn lock_mode(&self) -> LockMode {
        self.lock_data.mode()
    }

    fn opened(&self) -> LdbResult<(&Arc<TableHandle>, &TableSchema)> {
        match (&self.share, &self.schema) {
            (Some(share), Some(schema)) => Ok((share, schema)),
            _ => Err(LdbError::TableNotOpen(
                self.table_name().unwrap_or("<none>").to_string(),
            )),
        }
    }

    fn check_row(schema: &TableSchema, row: &[u8]) -> LdbResult<()> {
        if row.len() != schema.record_length {
            return Err(LdbError::InvalidRow(format!(
                "row has {} bytes, record length is {}",
                row.len(),
                schema.record_length
            )));
        }
        Ok(())
    }

    /// Session transaction for the open table.
    fn transaction<'s>(session: &'s mut Session, share: &TableHandle) -> LdbResult<&'s mut Transaction> {
        let id = session.id();
        session.transaction_mut(share.name()).ok_or_else(|| {
            LdbError::Protocol(format!(
                "session {id} writes to '{}' without holding a lock",
                share.name()
            ))
        })
    }

    fn encoded(&self, row: &[u8]) -> Vec<u8> {
        ValueCodec::new(self.engine.variables().compression()).encode(row)
    }

    /// Give back every lock this handler still counts against the table.
    fn drop_held_locks(&mut self) {
        if let Some(share) = &self.share {
            for lock in self.held.drain(..) {
                share.release_lock(lock);
            }
        }
        self.held.clear();
        self.lock_data.reset();
    }
}

impl TableOps for TableHandler {
    fn open(&mut self, name: &str, schema: &TableSchema) -> LdbResult<()> {
        debug!(table = name, "open");
        if let Some(current) = self.table_name() {
            return Err(LdbError::Protocol(format!(
                "handler already has '{current}' open"
            )));
        }
        schema.validate()?;

        let path = self.engine.table_path(name);
        let options = self.engine.variables().store_options();
        let share = self.engine.registry().get_or_create(name, &path, &options)?;
        self.share = Some(share);
        self.schema = Some(schema.clone());
        Ok(())
    }

    fn close(&mut self) -> LdbResult<()> {
        debug!(table = ?self.table_name(), "close");
        self.drop_held_locks();
        let share = self
            .share
            .take()
            .ok_or_else(|| LdbError::TableNotOpen("<none>".to_string()))?;
        self.schema = None;
        self.engine.registry().release(&share)
    }

    fn create(&mut self, name: &str, schema: &TableSchema) -> LdbResult<()> {
        debug!(table = name, "create");
        schema.validate()?;

        let path = self.engine.table_path(name);
        let options = self.engine.variables().store_options();
        KvStore::open_or_create(&path, true, &options)?.close()
    }

    fn delete_table(&mut self, name: &str) -> LdbResult<()> {
        debug!(table = name, "delete_table");
        KvStore::destroy(&self.engine.table_path(name))?;
        self.engine.status().remove_table(name);
        Ok(())
    }

    fn write_row(&mut self, session: &mut Session, row: &[u8]) -> LdbResult<()> {
        debug!(session = session.id(), "write_row");
        let (share, schema) = self.opened()?;
        Self::check_row(schema, row)?;
        let key = derive_key(row, schema)?;
        let value = self.encoded(row);
        Self::transaction(session, share)?.put(key, value);
        Ok(())
    }

    fn update_row(&mut self, session: &mut Session, old_row: &[u8], new_row: &[u8]) -> LdbResult<()> {
        debug!(session = session.id(), "update_row");
        let (share, schema) = self.opened()?;
        Self::check_row(schema, old_row)?;
        Self::check_row(schema, new_row)?;
        let old_key = derive_key(old_row, schema)?;
        let new_key = derive_key(new_row, schema)?;
        let value = self.encoded(new_row);

        let txn = Self::transaction(session, share)?;
        if old_key != new_key {
            txn.delete(old_key);
        }
        txn.put(new_key, value);
        Ok(())
    }

    fn delete_row(&mut self, session: &mut Session, row: &[u8]) -> LdbResult<()> {
        debug!(session = session.id(), "delete_row");
        let (share, schema) = self.opened()?;
        Self::check_row(schema, row)?;
        let key = derive_key(row, schema)?;
        Self::transaction(session, share)?.delete(key);
        Ok(())
    }

    fn point_lookup(&self, key: &[u8]) -> LdbResult<Vec<u8>> {
        debug!(key_len = key.len(), "point_lookup");
        let (share, schema) = self.opened()?;
        let stored = share.get(key)?;
        share.stats().record_lookup(stored.is_some());
        match stored {
            Some(value) => ValueCodec::decode(&value, schema.record_length),
            None => Err(LdbError::NotFound),
        }
    }

    fn index_read(&self, key_buffer: &[u8]) -> LdbResult<Vec<u8>> {
        debug!(key_len = key_buffer.len(), "index_read");
        let (_, schema) = self.opened()?;
        let key = strip_key_buffer(key_buffer, schema.key_part()?)?;
        self.point_lookup(key)
    }

    fn store_lock(&mut self, requested: LockMode, statement: &StatementContext) -> LockMode {
        let granted = negotiate(requested, statement);
        self.lock_data.record(granted);
        debug!(?requested, ?granted, command = ?statement.command, "store_lock");
        granted
    }

    fn external_lock(&mut self, session: &mut Session, lock: ExternalLock) -> LdbResult<()> {
        debug!(session = session.id(), ?lock, "external_lock");
        let share = Arc::clone(self.opened()?.0);

        if lock != ExternalLock::Unlock {
            session.begin(&share, lock);
            share.acquire_lock(lock);
            self.held.push(lock);
            return Ok(());
        }

        let finished = session.end(share.name())?;
        if let Some(held) = self.held.pop() {
            share.release_lock(held);
        } else {
            warn!(table = share.name(), "release through a handler that did not acquire");
        }
        self.lock_data.reset();

        match finished {
            Some(txn) => txn.commit().inspect_err(|e| {
                error!(session = session.id(), table = share.name(), error = %e, "commit at lock release failed");
            }),
            None => Ok(()),
        }
    }
}

impl Drop for TableHandler {
    fn drop(&mut self) {
        if let Some(name) = self.table_name().map(str::to_string) {
            warn!(table = %name, "handler dropped while open");
            if let Err(e) = self.close() {
                warn!(table = %name, error = %e, "implicit close failed");
            }
        }
    }
}
