//! Status counters — engine-wide and per table.
//!
//! Counters are plain atomics updated on the hot path with relaxed ordering;
//! [`EngineStatus::show`] renders a consistent-enough snapshot for the host's
//! status command.

use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters of one table, shared by its handle and every handler on it.
#[derive(Debug, Default)]
pub struct TableStats {
    pub commits: AtomicU64,
    pub commit_failures: AtomicU64,
    pub rows_put: AtomicU64,
    pub rows_deleted: AtomicU64,
    pub lookups: AtomicU64,
    pub lookup_misses: AtomicU64,
    pub batches_discarded: AtomicU64,
}

impl TableStats {
    pub fn record_commit(&self, puts: usize, deletes: usize) {
        self.commits.fetch_add(1, Ordering::Relaxed);
        self.rows_put.fetch_add(puts as u64, Ordering::Relaxed);
        self.rows_deleted.fetch_add(deletes as u64, Ordering::Relaxed);
    }

    pub fn record_commit_failure(&self) {
        self.commit_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_lookup(&self, hit: bool) {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        if !hit {
            self.lookup_misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_discard(&self) {
        self.batches_discarded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> TableStatsSnapshot {
        TableStatsSnapshot {
            commits: self.commits.load(Ordering::Relaxed),
            commit_failures: self.commit_failures.load(Ordering::Relaxed),
            rows_put: self.rows_put.load(Ordering::Relaxed),
            rows_deleted: self.rows_deleted.load(Ordering::Relaxed),
            lookups: self.lookups.load(Ordering::Relaxed),
            lookup_misses: self.lookup_misses.load(Ordering::Relaxed),
            batches_discarded: self.batches_discarded.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`TableStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TableStatsSnapshot {
    pub commits: u64,
    pub commit_failures: u64,
    pub rows_put: u64,
    pub rows_deleted: u64,
    pub lookups: u64,
    pub lookup_misses: u64,
    pub batches_discarded: u64,
}

impl TableStatsSnapshot {
    fn fields(&self) -> [(&'static str, u64); 7] {
        [
            ("commits", self.commits),
            ("commit_failures", self.commit_failures),
            ("rows_put", self.rows_put),
            ("rows_deleted", self.rows_deleted),
            ("lookups", self.lookups),
            ("lookup_misses", self.lookup_misses),
            ("batches_discarded", self.batches_discarded),
        ]
    }
}

/// Engine-wide counters.
#[derive(Debug, Default)]
pub struct EngineStatus {
    pub store_opens: AtomicU64,
    pub store_closes: AtomicU64,
    tables: DashMap<String, Arc<TableStats>>,
}

impl EngineStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counters for `table`, created on first use.
    pub fn table(&self, table: &str) -> Arc<TableStats> {
        if let Some(stats) = self.tables.get(table) {
            return Arc::clone(stats.value());
        }
        Arc::clone(self.tables.entry(table.to_string()).or_default().value())
    }

    pub fn record_store_open(&self) {
        self.store_opens.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_store_close(&self) {
        self.store_closes.fetch_add(1, Ordering::Relaxed);
    }

    /// Stores currently open.
    pub fn open_stores(&self) -> u64 {
        let opens = self.store_opens.load(Ordering::Relaxed);
        opens.saturating_sub(self.store_closes.load(Ordering::Relaxed))
    }

    /// Forget the counters of a dropped table.
    pub fn remove_table(&self, table: &str) {
        self.tables.remove(table);
    }

    pub fn snapshot(&self) -> EngineStatusSnapshot {
        let mut tables: Vec<(String, TableStatsSnapshot)> = self
            .tables
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().snapshot()))
            .collect();
        tables.sort_by(|a, b| a.0.cmp(&b.0));
        EngineStatusSnapshot {
            store_opens: self.store_opens.load(Ordering::Relaxed),
            store_closes: self.store_closes.load(Ordering::Relaxed),
            tables,
        }
    }

    /// Status lines as `(name, value)` pairs, engine counters first.
    pub fn show(&self) -> Vec<(String, u64)> {
        let snapshot = self.snapshot();
        let mut lines = vec![
            ("ldb_store_opens".to_string(), snapshot.store_opens),
            ("ldb_store_closes".to_string(), snapshot.store_closes),
        ];
        for (table, stats) in &snapshot.tables {
            for (field, value) in stats.fields() {
                lines.push((format!("ldb.{table}.{field}"), value));
            }
        }
        lines
    }
}

/// Serializable copy of every counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineStatusSnapshot {
    pub store_opens: u64,
    pub store_closes: u64,
    pub tables: Vec<(String, TableStatsSnapshot)>,
}

impl EngineStatusSnapshot {
    pub fn to_json(&self) -> crate::error::LdbResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
