//! Transaction module — lock negotiation and per-session write batching
//!
//! Writes never reach the store directly: they are appended to the session's
//! [`Transaction`] for the table and applied as one atomic batch when the
//! session releases its last lock on that table.

pub mod lock;
pub mod session;

pub use lock::{ExternalLock, LockData, LockMode, SqlCommand, StatementContext, TableLock, negotiate};
pub use session::{Session, Transaction};
