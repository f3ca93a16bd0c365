//! Error types for the ldb table adapter.
//!
//! All public APIs return `LdbResult<T>` — no panics in library code.

use std::path::PathBuf;
use thiserror::Error;

/// Handler status codes understood by the host executor.
///
/// A host shim translates [`LdbError`] into these with [`LdbError::handler_code`].
pub mod codes {
    /// Generic failure.
    pub const HA_ERR_GENERIC: i32 = 1;
    /// Table definition not usable by this engine.
    pub const HA_ERR_WRONG_INDEX: i32 = 124;
    /// Stored data could not be decoded.
    pub const HA_ERR_CRASHED: i32 = 126;
    /// Operation is not implemented by this engine.
    pub const HA_ERR_WRONG_COMMAND: i32 = 131;
    /// No (more) rows for the request.
    pub const HA_ERR_END_OF_FILE: i32 = 137;
}

/// Unified error type for all adapter operations.
#[derive(Debug, Error)]
pub enum LdbError {
    /// Table definition rejected (must declare exactly one unique single-column key)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Underlying store could not be opened or created
    #[error("cannot open store at {path:?}: {reason}")]
    StoreOpen { path: PathBuf, reason: String },

    /// Atomic batch commit failed at lock release
    #[error("batch commit failed: {0}")]
    StoreWrite(String),

    /// Point lookup found no entry for the key
    #[error("key not found")]
    NotFound,

    /// Scan, range, positional, truncate and rename requests
    #[error("operation not supported: {operation}")]
    UnsupportedOperation { operation: &'static str },

    /// Lock acquire/release sequence violated
    #[error("lock protocol error: {0}")]
    Protocol(String),

    /// Row buffer does not match the table layout
    #[error("invalid row: {0}")]
    InvalidRow(String),

    /// Stored value could not be decoded
    #[error("corrupted value: {0}")]
    Corruption(String),

    /// Operation requires an open table
    #[error("table '{0}' is not open")]
    TableNotOpen(String),

    /// Shutdown requested while tables are still referenced
    #[error("registry still holds open tables: {tables:?}")]
    RegistryBusy { tables: Vec<String> },

    /// sled embedded database error
    #[error("sled error: {source}")]
    Sled {
        #[from]
        source: sled::Error,
    },

    /// Standard I/O error
    #[error("io error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Configuration file (de)serialization error
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl LdbError {
    /// Map this error onto the host's numeric handler status.
    pub fn handler_code(&self) -> i32 {
        match self {
            LdbError::NotFound => codes::HA_ERR_END_OF_FILE,
            LdbError::UnsupportedOperation { .. } => codes::HA_ERR_WRONG_COMMAND,
            LdbError::Configuration(_) => codes::HA_ERR_WRONG_INDEX,
            LdbError::Corruption(_) => codes::HA_ERR_CRASHED,
            _ => codes::HA_ERR_GENERIC,
        }
    }

    /// True for the fixed result of every unimplemented host operation.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, LdbError::UnsupportedOperation { .. })
    }
}

/// Result type alias for all adapter operations.
pub type LdbResult<T> = Result<T, LdbError>;

// From 구현
impl From<serde_json::Error> for LdbError {
    fn from(err: serde_json::Error) -> Self {
        LdbError::Serialization(err.to_string())
    }
}
