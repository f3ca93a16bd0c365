//! Engine — 스토리지 엔진 플러그인 수명 주기
//!
//! The [`Engine`] is created once when the host loads the storage engine and
//! owns everything shared between connections: the table registry, the
//! status counters and the system variables. Handlers and sessions are
//! created from it.
//!
//! # 예제
//!
//! ```rust
//! use ldb_core::{Engine, EngineConfig, ExternalLock, KeyPart, KeyType, TableOps, TableSchema};
//!
//! # fn main() -> ldb_core::LdbResult<()> {
//! let dir = tempfile::tempdir()?;
//! let engine = Engine::init(EngineConfig::new(dir.path()))?;
//! let schema = TableSchema::single_key(8, KeyPart::new("id", 0, 4, KeyType::Binary));
//!
//! let mut handler = engine.handler();
//! handler.create("users", &schema)?;
//! handler.open("users", &schema)?;
//!
//! let mut session = engine.new_session();
//! handler.external_lock(&mut session, ExternalLock::Write)?;
//! handler.write_row(&mut session, b"u001Anna")?;
//! handler.external_lock(&mut session, ExternalLock::Unlock)?;
//!
//! assert_eq!(handler.point_lookup(b"u001")?, b"u001Anna".to_vec());
//! handler.close()?;
//! engine.shutdown()?;
//! # Ok(())
//! # }
//! ```

use crate::config::EngineConfig;
use crate::engine::handler::TableHandler;
use crate::engine::registry::TableRegistry;
use crate::engine::status::EngineStatus;
use crate::engine::surface::FullSurface;
use crate::engine::variables::SystemVariables;
use crate::error::LdbResult;
use crate::transaction::session::Session;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Process-wide engine state.
#[derive(Debug)]
pub struct Engine {
    variables: SystemVariables,
    status: Arc<EngineStatus>,
    registry: TableRegistry,
    next_session: AtomicU64,
}

impl Engine {
    /// 엔진 초기화
    ///
    /// Validates `config`, makes sure the data directory exists and starts
    /// an empty registry.
    pub fn init(config: EngineConfig) -> LdbResult<Arc<Self>> {
        config.validate()?;
        fs::create_dir_all(&config.data_dir)?;

        let status = Arc::new(EngineStatus::new());
        let registry = TableRegistry::init(Arc::clone(&status));
        info!(
            data_dir = %config.data_dir.display(),
            write_buffer_size = config.write_buffer_size,
            sync_writes = config.sync_writes,
            compression = %config.compression.algorithm(),
            "ldb engine initialized"
        );

        Ok(Arc::new(Self {
            variables: SystemVariables::new(config),
            status,
            registry,
            next_session: AtomicU64::new(1),
        }))
    }

    /// Load configuration from defaults and `LDB_*` variables, then start.
    pub fn init_from_env() -> LdbResult<Arc<Self>> {
        Self::init(EngineConfig::default().apply_env()?)
    }

    /// New handler for one table (handler factory).
    pub fn handler(self: &Arc<Self>) -> TableHandler {
        TableHandler::new(Arc::clone(self))
    }

    /// New handler wrapped in the full host surface.
    pub fn surface(self: &Arc<Self>) -> FullSurface<TableHandler> {
        FullSurface::new(self.handler())
    }

    /// Context for a new host connection.
    pub fn new_session(&self) -> Session {
        Session::new(self.next_session.fetch_add(1, Ordering::Relaxed))
    }

    pub fn variables(&self) -> &SystemVariables {
        &self.variables
    }

    pub fn status(&self) -> &EngineStatus {
        &self.status
    }

    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    pub fn table_path(&self, table_name: &str) -> PathBuf {
        self.variables.table_path(table_name)
    }

    /// Status lines for the host's engine-status command.
    pub fn show_status(&self) -> Vec<(String, u64)> {
        self.status.show()
    }

    /// 엔진 종료. Fails while any table is still open.
    pub fn shutdown(&self) -> LdbResult<()> {
        self.registry.shutdown()?;
        info!(
            store_opens = self.status.store_opens.load(Ordering::Relaxed),
            store_closes = self.status.store_closes.load(Ordering::Relaxed),
            "ldb engine shut down"
        );
        Ok(())
    }
}
