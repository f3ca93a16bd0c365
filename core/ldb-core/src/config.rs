//! Engine configuration.
//!
//! Settings are layered: built-in defaults, then an optional JSON file,
//! then `LDB_*` environment variables.
//!
//! # Example
//!
//! ```rust
//! use ldb_core::config::{CompressionConfig, EngineConfig};
//!
//! let config = EngineConfig::new("./data")
//!     .with_sync_writes(true)
//!     .with_compression(CompressionConfig::zstd_level(6));
//! assert_eq!(config.table_path("db1/users"), std::path::Path::new("./data/db1/users"));
//! ```

use crate::error::{LdbError, LdbResult};
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Write buffer handed to every opened store (32 MiB).
pub const DEFAULT_WRITE_BUFFER_SIZE: u64 = 33_554_432;

/// Smallest accepted write buffer.
pub const MIN_WRITE_BUFFER_SIZE: u64 = 64 * 1024;

/// Largest accepted write buffer.
pub const MAX_WRITE_BUFFER_SIZE: u64 = 1 << 30;

/// Valid zstd levels.
pub const ZSTD_LEVELS: std::ops::RangeInclusive<i32> = 1..=22;

const ENV_DATA_DIR: &str = "LDB_DATA_DIR";
const ENV_WRITE_BUFFER_SIZE: &str = "LDB_WRITE_BUFFER_SIZE";
const ENV_SYNC_WRITES: &str = "LDB_SYNC_WRITES";
const ENV_COMPRESSION: &str = "LDB_COMPRESSION";
const ENV_COMPRESSION_LEVEL: &str = "LDB_COMPRESSION_LEVEL";

/// Row value compression algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionAlgorithm {
    /// Rows are stored as-is.
    None,
    /// Rows are zstd-compressed when that makes them smaller.
    Zstd,
}

impl CompressionAlgorithm {
    /// Parse the lowercase name used by config files and system variables.
    pub fn parse_algorithm(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Some(Self::None),
            "zstd" => Some(Self::Zstd),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Zstd => "zstd",
        }
    }
}

impl fmt::Display for CompressionAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compression settings for stored rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionConfig {
    algorithm: CompressionAlgorithm,
    /// zstd level, clamped to 1-22
    level: i32,
}

impl Default for CompressionConfig {
    /// Default compression: zstd level 3.
    fn default() -> Self {
        Self {
            algorithm: CompressionAlgorithm::Zstd,
            level: 3,
        }
    }
}

impl CompressionConfig {
    pub fn new(algorithm: CompressionAlgorithm) -> Self {
        Self {
            algorithm,
            ..Self::default()
        }
    }

    /// Set the zstd level. Out-of-range levels are clamped.
    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level.clamp(*ZSTD_LEVELS.start(), *ZSTD_LEVELS.end());
        self
    }

    pub fn algorithm(&self) -> CompressionAlgorithm {
        self.algorithm
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    /// Preset: rows stored uncompressed.
    pub fn none() -> Self {
        Self::new(CompressionAlgorithm::None)
    }

    /// Preset: zstd with the default level.
    pub fn zstd() -> Self {
        Self::new(CompressionAlgorithm::Zstd)
    }

    /// Preset: zstd with the given level (1-22).
    pub fn zstd_level(level: i32) -> Self {
        Self::zstd().with_level(level)
    }
}

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Root under which every table's store directory lives.
    pub data_dir: PathBuf,
    /// Write buffer (sled cache capacity) per opened store, in bytes.
    pub write_buffer_size: u64,
    /// Flush every committed batch to disk before lock release returns.
    pub sync_writes: bool,
    pub compression: CompressionConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            write_buffer_size: DEFAULT_WRITE_BUFFER_SIZE,
            sync_writes: true,
            compression: CompressionConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_write_buffer_size(mut self, bytes: u64) -> Self {
        self.write_buffer_size = bytes;
        self
    }

    pub fn with_sync_writes(mut self, sync: bool) -> Self {
        self.sync_writes = sync;
        self
    }

    pub fn with_compression(mut self, compression: CompressionConfig) -> Self {
        self.compression = compression;
        self
    }

    /// Store directory for a table. Absolute table names are used as-is.
    pub fn table_path(&self, table_name: &str) -> PathBuf {
        self.data_dir.join(table_name)
    }

    /// Check value ranges.
    pub fn validate(&self) -> LdbResult<()> {
        if !(MIN_WRITE_BUFFER_SIZE..=MAX_WRITE_BUFFER_SIZE).contains(&self.write_buffer_size) {
            return Err(LdbError::Configuration(format!(
                "write_buffer_size {} outside {}..={}",
                self.write_buffer_size, MIN_WRITE_BUFFER_SIZE, MAX_WRITE_BUFFER_SIZE
            )));
        }
        Ok(())
    }

    /// JSON 파일에서 로드
    pub fn load_from_file(path: &Path) -> LdbResult<Self> {
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// JSON 파일로 저장
    pub fn save_to_file(&self, path: &Path) -> LdbResult<()> {
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text)?;
        Ok(())
    }

    /// 환경 변수 적용 (`LDB_*`)
    pub fn apply_env(self) -> LdbResult<Self> {
        self.apply_overrides(|name| env::var(name).ok())
    }

    /// Apply `LDB_*` overrides from an arbitrary lookup.
    pub fn apply_overrides<F>(mut self, lookup: F) -> LdbResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(size) = lookup(ENV_WRITE_BUFFER_SIZE) {
            self.write_buffer_size = size.trim().parse().map_err(|_| {
                LdbError::Configuration(format!("{ENV_WRITE_BUFFER_SIZE}: not a byte count: {size}"))
            })?;
        }
        if let Some(sync) = lookup(ENV_SYNC_WRITES) {
            self.sync_writes = parse_switch(&sync).ok_or_else(|| {
                LdbError::Configuration(format!("{ENV_SYNC_WRITES}: expected on/off, got {sync}"))
            })?;
        }
        if let Some(name) = lookup(ENV_COMPRESSION) {
            let algorithm = CompressionAlgorithm::parse_algorithm(&name).ok_or_else(|| {
                LdbError::Configuration(format!("{ENV_COMPRESSION}: unknown algorithm {name}"))
            })?;
            self.compression = CompressionConfig::new(algorithm).with_level(self.compression.level);
        }
        if let Some(level) = lookup(ENV_COMPRESSION_LEVEL) {
            let level: i32 = level.trim().parse().map_err(|_| {
                LdbError::Configuration(format!("{ENV_COMPRESSION_LEVEL}: not a number: {level}"))
            })?;
            self.compression = self.compression.with_level(level);
        }
        self.validate()?;
        Ok(self)
    }
}

/// Parse the boolean spellings accepted for switches.
pub(crate) fn parse_switch(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "on" | "true" | "yes" => Some(true),
        "0" | "off" | "false" | "no" => Some(false),
        _ => None,
    }
}
