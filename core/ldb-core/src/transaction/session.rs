//! Session — 연결별 트랜잭션 컨텍스트
//!
//! A [`Session`] stands for one host connection. It owns at most one
//! [`Transaction`] per table; the transaction exists between the first lock
//! acquisition on that table and the matching release.
//!
//! ```text
//! ABSENT ──acquire──▶ ACTIVE ──release (depth 0)──▶ COMMITTING ──▶ ABSENT
//!                      │  ▲
//!                      └──┘ acquire / release (depth > 0)
//! ```

use crate::engine::handle::TableHandle;
use crate::error::{LdbError, LdbResult};
use crate::storage::batch::WriteBatch;
use crate::transaction::lock::ExternalLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Pending mutations of one session against one table.
#[derive(Debug)]
pub struct Transaction {
    session_id: u64,
    handle: Arc<TableHandle>,
    batch: WriteBatch,
    /// Outstanding acquisitions of the table within the session
    lock_depth: usize,
    /// Kind of the first acquisition
    lock: ExternalLock,
}

impl Transaction {
    fn new(session_id: u64, handle: Arc<TableHandle>, lock: ExternalLock) -> Self {
        Self {
            session_id,
            handle,
            batch: WriteBatch::new(),
            lock_depth: 1,
            lock,
        }
    }

    /// Append a put; overrides earlier operations on `key` at commit.
    pub fn put(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.batch.put(key, value);
    }

    /// Append a delete; overrides earlier operations on `key` at commit.
    pub fn delete(&mut self, key: Vec<u8>) {
        self.batch.delete(key);
    }

    pub fn batch(&self) -> &WriteBatch {
        &self.batch
    }

    pub fn table(&self) -> &str {
        self.handle.name()
    }

    pub fn handle(&self) -> &Arc<TableHandle> {
        &self.handle
    }

    pub fn session_id(&self) -> u64 {
        self.session_id
    }

    pub fn lock_depth(&self) -> usize {
        self.lock_depth
    }

    pub fn lock(&self) -> ExternalLock {
        self.lock
    }

    /// Apply the batch as one atomic write and consume the transaction.
    ///
    /// The transaction is gone whether or not the write succeeds.
    pub fn commit(self) -> LdbResult<()> {
        debug!(
            session = self.session_id,
            table = self.handle.name(),
            ops = self.batch.len(),
            "committing batch"
        );
        self.handle.commit(self.batch)
    }

    /// Drop the batch without applying it.
    fn discard(self) {
        if !self.batch.is_empty() {
            warn!(
                session = self.session_id,
                table = self.handle.name(),
                ops = self.batch.len(),
                "discarding uncommitted batch"
            );
            self.handle.stats().record_discard();
        }
    }
}

/// Per-connection context passed explicitly to every session-bound operation.
#[derive(Debug)]
pub struct Session {
    id: u64,
    transactions: HashMap<String, Transaction>,
}

impl Session {
    pub fn new(id: u64) -> Self {
        Self {
            id,
            transactions: HashMap::new(),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// Enter a lock scope on `handle`'s table.
    ///
    /// Creates the transaction when absent, otherwise deepens the scope.
    /// Returns `true` if a new transaction was created.
    pub(crate) fn begin(&mut self, handle: &Arc<TableHandle>, lock: ExternalLock) -> bool {
        match self.transactions.get_mut(handle.name()) {
            Some(txn) => {
                txn.lock_depth += 1;
                debug!(session = self.id, table = handle.name(), depth = txn.lock_depth, "nested lock");
                false
            }
            None => {
                self.transactions.insert(
                    handle.name().to_string(),
                    Transaction::new(self.id, Arc::clone(handle), lock),
                );
                debug!(session = self.id, table = handle.name(), "transaction started");
                true
            }
        }
    }

    /// Leave a lock scope on `table`.
    ///
    /// Returns the transaction once the outermost scope ends; the caller
    /// commits it. Leaving a scope that was never entered is a protocol
    /// error.
    pub(crate) fn end(&mut self, table: &str) -> LdbResult<Option<Transaction>> {
        let id = self.id;
        let txn = self.transactions.get_mut(table).ok_or_else(|| {
            LdbError::Protocol(format!(
                "session {id} released '{table}' without holding a lock"
            ))
        })?;

        txn.lock_depth -= 1;
        if txn.lock_depth > 0 {
            return Ok(None);
        }
        Ok(self.transactions.remove(table))
    }

    pub fn transaction(&self, table: &str) -> Option<&Transaction> {
        self.transactions.get(table)
    }

    pub fn transaction_mut(&mut self, table: &str) -> Option<&mut Transaction> {
        self.transactions.get_mut(table)
    }

    pub fn has_transaction(&self, table: &str) -> bool {
        self.transactions.contains_key(table)
    }

    /// Tables with an active transaction, sorted.
    pub fn active_tables(&self) -> Vec<String> {
        let mut tables: Vec<String> = self.transactions.keys().cloned().collect();
        tables.sort();
        tables
    }

    /// Drop every active transaction without applying it.
    ///
    /// Returns the number of transactions discarded.
    pub fn discard_all(&mut self) -> usize {
        let count = self.transactions.len();
        for (_, txn) in self.transactions.drain() {
            txn.discard();
        }
        count
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.transactions.is_empty() {
            warn!(
                session = self.id,
                tables = ?self.active_tables(),
                "session ended with open lock scopes"
            );
            self.discard_all();
        }
    }
}
