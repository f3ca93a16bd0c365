//! System variables — runtime-tunable engine settings addressed by name.
//!
//! Changes to `ldb_write_buffer_size` and `ldb_sync_writes` apply to stores
//! opened afterwards; compression changes apply to the next written row.

use crate::config::{
    CompressionAlgorithm, CompressionConfig, EngineConfig, MAX_WRITE_BUFFER_SIZE,
    MIN_WRITE_BUFFER_SIZE, ZSTD_LEVELS, parse_switch,
};
use crate::error::{LdbError, LdbResult};
use crate::storage::store::StoreOptions;
use parking_lot::RwLock;
use std::path::PathBuf;
use tracing::info;

pub const WRITE_BUFFER_SIZE: &str = "ldb_write_buffer_size";
pub const SYNC_WRITES: &str = "ldb_sync_writes";
pub const COMPRESSION: &str = "ldb_compression";
pub const COMPRESSION_LEVEL: &str = "ldb_compression_level";
/// Read-only
pub const DATA_DIR: &str = "ldb_data_dir";

/// Every variable name, in display order.
pub const NAMES: [&str; 5] = [
    DATA_DIR,
    WRITE_BUFFER_SIZE,
    SYNC_WRITES,
    COMPRESSION,
    COMPRESSION_LEVEL,
];

/// 엔진 시스템 변수 — 스레드 안전
#[derive(Debug)]
pub struct SystemVariables {
    config: RwLock<EngineConfig>,
}

impl SystemVariables {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config: RwLock::new(config),
        }
    }

    /// Render the current value of `name`.
    pub fn get(&self, name: &str) -> LdbResult<String> {
        let config = self.config.read();
        let value = match name {
            DATA_DIR => config.data_dir.display().to_string(),
            WRITE_BUFFER_SIZE => config.write_buffer_size.to_string(),
            SYNC_WRITES => (if config.sync_writes { "ON" } else { "OFF" }).to_string(),
            COMPRESSION => config.compression.algorithm().to_string(),
            COMPRESSION_LEVEL => config.compression.level().to_string(),
            other => return Err(unknown(other)),
        };
        Ok(value)
    }

    /// Validate and assign `value` to `name`.
    pub fn set(&self, name: &str, value: &str) -> LdbResult<()> {
        let mut config = self.config.write();
        match name {
            DATA_DIR => {
                return Err(LdbError::Configuration(format!("{DATA_DIR} is read-only")));
            }
            WRITE_BUFFER_SIZE => {
                let bytes: u64 = value
                    .trim()
                    .parse()
                    .map_err(|_| invalid(name, value))?;
                if !(MIN_WRITE_BUFFER_SIZE..=MAX_WRITE_BUFFER_SIZE).contains(&bytes) {
                    return Err(LdbError::Configuration(format!(
                        "{name}: {bytes} outside {MIN_WRITE_BUFFER_SIZE}..={MAX_WRITE_BUFFER_SIZE}"
                    )));
                }
                config.write_buffer_size = bytes;
            }
            SYNC_WRITES => {
                config.sync_writes = parse_switch(value).ok_or_else(|| invalid(name, value))?;
            }
            COMPRESSION => {
                let algorithm = CompressionAlgorithm::parse_algorithm(value)
                    .ok_or_else(|| invalid(name, value))?;
                config.compression =
                    CompressionConfig::new(algorithm).with_level(config.compression.level());
            }
            COMPRESSION_LEVEL => {
                let level: i32 = value.trim().parse().map_err(|_| invalid(name, value))?;
                if !ZSTD_LEVELS.contains(&level) {
                    return Err(LdbError::Configuration(format!(
                        "{name}: {level} outside {}..={}",
                        ZSTD_LEVELS.start(),
                        ZSTD_LEVELS.end()
                    )));
                }
                config.compression = config.compression.with_level(level);
            }
            other => return Err(unknown(other)),
        }
        info!(variable = name, value, "system variable updated");
        Ok(())
    }

    /// `(name, value)` for every variable.
    pub fn list(&self) -> Vec<(&'static str, String)> {
        NAMES
            .iter()
            .filter_map(|name| self.get(name).ok().map(|value| (*name, value)))
            .collect()
    }

    /// Copy of the current settings.
    pub fn snapshot(&self) -> EngineConfig {
        self.config.read().clone()
    }

    pub fn store_options(&self) -> StoreOptions {
        StoreOptions::from(&*self.config.read())
    }

    pub fn compression(&self) -> CompressionConfig {
        self.config.read().compression
    }

    pub fn table_path(&self, table_name: &str) -> PathBuf {
        self.config.read().table_path(table_name)
    }
}

fn unknown(name: &str) -> LdbError {
    LdbError::Configuration(format!("unknown system variable '{name}'"))
}

fn invalid(name: &str, value: &str) -> LdbError {
    LdbError::Configuration(format!("{name}: invalid value '{value}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars() -> SystemVariables {
        SystemVariables::new(EngineConfig::new("/data"))
    }

    #[test]
    fn defaults_rendered() {
        let vars = vars();
        assert_eq!(vars.get(WRITE_BUFFER_SIZE).unwrap(), "33554432");
        assert_eq!(vars.get(SYNC_WRITES).unwrap(), "ON");
        assert_eq!(vars.get(COMPRESSION).unwrap(), "zstd");
        assert_eq!(vars.get(COMPRESSION_LEVEL).unwrap(), "3");
        assert_eq!(vars.list().len(), NAMES.len());
    }

    #[test]
    fn set_updates_store_options() {
        let vars = vars();
        vars.set(WRITE_BUFFER_SIZE, "1048576").unwrap();
        vars.set(SYNC_WRITES, "off").unwrap();
        let options = vars.store_options();
        assert_eq!(options.write_buffer_size, 1_048_576);
        assert!(!options.sync_writes);
    }

    #[test]
    fn compression_keeps_level_across_algorithm_change() {
        let vars = vars();
        vars.set(COMPRESSION_LEVEL, "9").unwrap();
        vars.set(COMPRESSION, "none").unwrap();
        vars.set(COMPRESSION, "zstd").unwrap();
        assert_eq!(vars.compression(), CompressionConfig::zstd_level(9));
    }

    #[test]
    fn invalid_assignments_rejected() {
        let vars = vars();
        for (name, value) in [
            (WRITE_BUFFER_SIZE, "12"),
            (WRITE_BUFFER_SIZE, "lots"),
            (SYNC_WRITES, "maybe"),
            (COMPRESSION, "lz4"),
            (COMPRESSION_LEVEL, "23"),
            (DATA_DIR, "/elsewhere"),
            ("ldb_cache_size", "1"),
        ] {
            assert!(
                matches!(vars.set(name, value), Err(LdbError::Configuration(_))),
                "{name}={value}"
            );
        }
        assert_eq!(vars.snapshot(), EngineConfig::new("/data"));
    }
}
