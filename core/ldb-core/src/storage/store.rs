//! Store binding — one sled instance per table directory.
//!
//! Opening configures the write buffer (sled cache capacity) and durability
//! once per instance. Callers never close a store directly; the table
//! registry pairs every open with exactly one close.

use crate::config::EngineConfig;
use crate::error::{LdbError, LdbResult};
use crate::storage::batch::WriteBatch;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

/// Per-instance store settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreOptions {
    pub write_buffer_size: u64,
    /// Flush to disk after every batch
    pub sync_writes: bool,
}

impl From<&EngineConfig> for StoreOptions {
    fn from(config: &EngineConfig) -> Self {
        Self {
            write_buffer_size: config.write_buffer_size,
            sync_writes: config.sync_writes,
        }
    }
}

/// An open ordered key-value store rooted at a table's directory.
pub struct KvStore {
    db: sled::Db,
    path: PathBuf,
    sync_writes: bool,
}

impl std::fmt::Debug for KvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvStore")
            .field("path", &self.path)
            .field("sync_writes", &self.sync_writes)
            .finish()
    }
}

impl KvStore {
    /// Open the store at `path`.
    ///
    /// With `create_if_missing == false` a missing directory is an error and
    /// nothing is created on disk.
    #[instrument(skip(path, options), fields(path = %path.display()))]
    pub fn open_or_create(
        path: &Path,
        create_if_missing: bool,
        options: &StoreOptions,
    ) -> LdbResult<Self> {
        if !create_if_missing && !path.is_dir() {
            return Err(LdbError::StoreOpen {
                path: path.to_path_buf(),
                reason: "store does not exist".to_string(),
            });
        }

        // Synchronous writes flush explicitly after each batch; otherwise let
        // sled's background flusher batch fsyncs.
        let flush_every_ms = if options.sync_writes { None } else { Some(500) };
        let db = sled::Config::new()
            .path(path)
            .cache_capacity(options.write_buffer_size)
            .mode(sled::Mode::HighThroughput)
            .flush_every_ms(flush_every_ms)
            .open()
            .map_err(|e| LdbError::StoreOpen {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        info!(create_if_missing, "store opened");
        Ok(Self {
            db,
            path: path.to_path_buf(),
            sync_writes: options.sync_writes,
        })
    }

    /// Remove every on-disk trace of the store at `path`.
    ///
    /// A missing directory is not an error.
    #[instrument(skip(path), fields(path = %path.display()))]
    pub fn destroy(path: &Path) -> LdbResult<()> {
        match fs::remove_dir_all(path) {
            Ok(()) => {
                info!("store destroyed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("nothing to destroy");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Point read of the committed value for `key`.
    pub fn get(&self, key: &[u8]) -> LdbResult<Option<Vec<u8>>> {
        Ok(self.db.get(key)?.map(|ivec| ivec.to_vec()))
    }

    /// Apply `batch` as one atomic write, durable before return when
    /// `sync_writes` is set.
    pub fn write(&self, batch: WriteBatch) -> LdbResult<()> {
        if batch.is_empty() {
            return Ok(());
        }
        self.db
            .apply_batch(batch.into_sled())
            .map_err(|e| LdbError::StoreWrite(e.to_string()))?;
        if self.sync_writes {
            self.db
                .flush()
                .map_err(|e| LdbError::StoreWrite(e.to_string()))?;
        }
        Ok(())
    }

    /// Number of committed entries.
    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush outstanding writes and release the instance.
    pub fn close(self) -> LdbResult<()> {
        self.db.flush()?;
        info!(path = %self.path.display(), "store closed");
        Ok(())
    }
}
