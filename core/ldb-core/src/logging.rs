//! Logging setup for ldb-core
//!
//! The library only emits `tracing` events. A host or test installs a
//! subscriber with one of these helpers; without the `logging` feature they
//! do nothing.
//!
//! Filter precedence: `LDB_LOG`, then `RUST_LOG`, then the level passed in.
//! sled's own events are capped at `warn` unless a directive names it.

#[cfg(feature = "logging")]
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable read before `RUST_LOG`.
pub const LOG_ENV: &str = "LDB_LOG";

#[cfg(feature = "logging")]
fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},sled=warn")))
}

/// Install a subscriber at `info`.
///
/// # Example
/// ```rust
/// ldb_core::logging::init();
/// ```
pub fn init() -> bool {
    init_with_level("info")
}

/// Install a subscriber at `level` (trace, debug, info, warn, error).
///
/// Returns `false` when a global subscriber was already installed or the
/// `logging` feature is off.
#[cfg(feature = "logging")]
pub fn init_with_level(level: &str) -> bool {
    fmt()
        .with_env_filter(filter_for(level))
        .with_target(true)
        .with_thread_ids(true)
        .compact()
        .try_init()
        .is_ok()
}

/// Subscriber for tests: this crate at `debug`, output captured per test.
#[cfg(feature = "logging")]
pub fn init_test() -> bool {
    fmt()
        .with_env_filter(EnvFilter::new("ldb_core=debug,sled=warn"))
        .with_test_writer()
        .try_init()
        .is_ok()
}

#[cfg(not(feature = "logging"))]
pub fn init_with_level(_level: &str) -> bool {
    false
}

#[cfg(not(feature = "logging"))]
pub fn init_test() -> bool {
    false
}
