//! Table lock modes and the lock-broadening policy.
//!
//! Two lock conversations happen per statement:
//!
//! 1. `store_lock` — the host asks for a table-level [`LockMode`]; the engine
//!    may grant a different one ([`negotiate`]).
//! 2. `external_lock` — the host signals [`ExternalLock`] acquire/release,
//!    which drives the session's transaction lifecycle.

use crate::error::{LdbError, LdbResult};
use std::ops::RangeInclusive;

/// Table-level lock modes, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LockMode {
    /// Repeat of the previous request; never recorded
    Ignore,
    Unlock,
    ReadDefault,
    Read,
    ReadWithSharedLocks,
    ReadHighPriority,
    ReadNoInsert,
    /// Writing while other readers and writers proceed
    WriteAllowWrite,
    WriteConcurrentInsert,
    WriteDelayed,
    WriteDefault,
    WriteLowPriority,
    Write,
    WriteOnly,
}

impl LockMode {
    /// Modes broadened to [`LockMode::WriteAllowWrite`] by [`negotiate`].
    pub const BROADENED: RangeInclusive<LockMode> =
        LockMode::WriteConcurrentInsert..=LockMode::Write;
}

/// Kind of statement that is requesting the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlCommand {
    Select,
    Insert,
    Update,
    Delete,
    Replace,
    LockTables,
    Truncate,
    Optimize,
    CreateTable,
    AlterTable,
    Other,
}

/// What the host knows about the statement taking the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementContext {
    pub command: SqlCommand,
    /// Session is inside LOCK TABLES
    pub in_lock_tables: bool,
    /// Statement is a tablespace operation (DISCARD/IMPORT TABLESPACE)
    pub tablespace_op: bool,
}

impl StatementContext {
    pub fn new(command: SqlCommand) -> Self {
        Self {
            command,
            in_lock_tables: false,
            tablespace_op: false,
        }
    }

    pub fn in_lock_tables(mut self) -> Self {
        self.in_lock_tables = true;
        self
    }

    pub fn tablespace_op(mut self) -> Self {
        self.tablespace_op = true;
        self
    }

    /// Structural statements keep the stricter requested mode.
    pub fn keeps_requested_lock(&self) -> bool {
        (self.in_lock_tables && self.command == SqlCommand::LockTables)
            || self.tablespace_op
            || matches!(
                self.command,
                SqlCommand::Truncate | SqlCommand::Optimize | SqlCommand::CreateTable
            )
    }
}

/// Grant a lock mode for a request.
///
/// Write requests in [`LockMode::BROADENED`] become
/// [`LockMode::WriteAllowWrite`] so several sessions can hold their own
/// transactions on the same table, unless the statement is structural.
/// Every other request is granted unchanged.
pub fn negotiate(requested: LockMode, statement: &StatementContext) -> LockMode {
    if LockMode::BROADENED.contains(&requested) && !statement.keeps_requested_lock() {
        LockMode::WriteAllowWrite
    } else {
        requested
    }
}

/// Acquire/release signal from the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExternalLock {
    Read,
    Write,
    Unlock,
}

impl ExternalLock {
    pub const RAW_READ: i32 = 0;
    pub const RAW_WRITE: i32 = 1;
    pub const RAW_UNLOCK: i32 = 2;
}

impl TryFrom<i32> for ExternalLock {
    type Error = LdbError;

    fn try_from(raw: i32) -> LdbResult<Self> {
        match raw {
            Self::RAW_READ => Ok(ExternalLock::Read),
            Self::RAW_WRITE => Ok(ExternalLock::Write),
            Self::RAW_UNLOCK => Ok(ExternalLock::Unlock),
            other => Err(LdbError::Protocol(format!("unrecognized lock type {other}"))),
        }
    }
}

/// Handler-local lock slot.
///
/// Records the granted mode only while the slot is unlocked; repeated
/// requests inside one statement keep the first grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockData {
    mode: LockMode,
}

impl Default for LockData {
    fn default() -> Self {
        Self {
            mode: LockMode::Unlock,
        }
    }
}

impl LockData {
    pub fn record(&mut self, mode: LockMode) {
        if mode != LockMode::Ignore && self.mode == LockMode::Unlock {
            self.mode = mode;
        }
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }

    pub fn reset(&mut self) {
        self.mode = LockMode::Unlock;
    }
}

/// Table-level lock descriptor shared by every session using a table.
///
/// Bookkeeping only; blocking between sessions is the host's lock manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableLock {
    readers: usize,
    writers: usize,
    grants: u64,
}

impl TableLock {
    pub fn acquire(&mut self, lock: ExternalLock) {
        match lock {
            ExternalLock::Read => self.readers += 1,
            ExternalLock::Write => self.writers += 1,
            ExternalLock::Unlock => return,
        }
        self.grants += 1;
    }

    pub fn release(&mut self, lock: ExternalLock) {
        match lock {
            ExternalLock::Read => self.readers = self.readers.saturating_sub(1),
            ExternalLock::Write => self.writers = self.writers.saturating_sub(1),
            ExternalLock::Unlock => {}
        }
    }

    pub fn readers(&self) -> usize {
        self.readers
    }

    pub fn writers(&self) -> usize {
        self.writers
    }

    /// Acquisitions since the descriptor was created.
    pub fn grants(&self) -> u64 {
        self.grants
    }

    pub fn is_idle(&self) -> bool {
        self.readers == 0 && self.writers == 0
    }
}
