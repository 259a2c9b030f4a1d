//! Configuration system for the cache simulator.
//!
//! This module defines the configuration structures used to parameterize a run. It provides:
//! 1. **Defaults:** Baseline geometry used when a field is omitted.
//! 2. **Structures:** Per-level `CacheConfig` and the hierarchy-wide `Config`.
//! 3. **Enums:** Recency-tracking mechanism for the LRU policy.
//!
//! Configuration is supplied either as the seven positional integers of the CLI
//! (`Config::from_params`) or as JSON (`Config::from_json_str` / `Config::from_json_file`).

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cache::geometry::Geometry;
use crate::common::{ConfigError, SimError};

/// Default configuration constants for the simulator.
mod defaults {
    /// Default block size in bytes, shared by every level.
    pub const BLOCK_SIZE: usize = 32;

    /// Default L1 capacity in bytes (8 KiB).
    pub const L1_SIZE: usize = 8192;

    /// Default L1 associativity.
    pub const L1_WAYS: usize = 4;
}

/// Mechanism used to track recency inside each set.
///
/// Both variants implement exact LRU and produce identical contents and statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub enum RecencyTracking {
    /// Per-line age counters (0 = most recently used).
    #[default]
    Age,
    /// Per-set ordered usage stack (front = most recently used).
    Stack,
}

/// Configuration of a single cache level.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Display name ("L1", "L2").
    #[serde(default)]
    pub name: String,
    /// Total capacity in bytes.
    pub size_bytes: usize,
    /// Associativity (ways per set).
    pub ways: usize,
    /// Block size in bytes.
    pub line_bytes: usize,
    /// LRU bookkeeping mechanism.
    #[serde(default)]
    pub recency: RecencyTracking,
}

impl CacheConfig {
    /// Creates a level configuration with age-counter recency tracking.
    pub fn new(name: impl Into<String>, size_bytes: usize, ways: usize, line_bytes: usize) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            ways,
            line_bytes,
            recency: RecencyTracking::Age,
        }
    }

    /// Returns the configuration with a different recency mechanism.
    #[must_use]
    pub fn with_recency(mut self, recency: RecencyTracking) -> Self {
        self.recency = recency;
        self
    }

    /// Validates the configuration and derives its geometry.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the geometry cannot be decomposed into
    /// tag/index/offset fields.
    pub fn geometry(&self) -> Result<Geometry, ConfigError> {
        Geometry::new(self)
    }
}

/// Capacity and associativity of one level; the block size is hierarchy-wide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct LevelConfig {
    /// Total capacity in bytes (0 disables the level).
    #[serde(default)]
    pub size_bytes: usize,
    /// Associativity (0 disables the level).
    #[serde(default)]
    pub ways: usize,
}

impl LevelConfig {
    /// A level is present only when both capacity and associativity are non-zero.
    pub const fn is_enabled(&self) -> bool {
        self.size_bytes > 0 && self.ways > 0
    }
}

/// Prefetcher parameters.
///
/// Accepted and echoed in the configuration block; no prefetching is modeled, so the
/// prefetch counters of every level stay at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct PrefetchConfig {
    /// Number of stream buffers.
    #[serde(default)]
    pub n: u32,
    /// Blocks per stream buffer.
    #[serde(default)]
    pub m: u32,
}

/// Root configuration of a simulation run.
///
/// # Examples
///
/// ```
/// use cachesim_core::config::{Config, RecencyTracking};
///
/// let json = r#"{
///     "block_size": 32,
///     "l1": { "size_bytes": 1024, "ways": 2 },
///     "l2": { "size_bytes": 8192, "ways": 4 },
///     "recency": "Stack"
/// }"#;
///
/// let config = Config::from_json_str(json).unwrap();
/// assert_eq!(config.l1_cache().size_bytes, 1024);
/// assert_eq!(config.l2_cache().unwrap().ways, 4);
/// assert_eq!(config.recency, RecencyTracking::Stack);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Block size in bytes, shared by every level.
    #[serde(default = "Config::default_block_size")]
    pub block_size: usize,
    /// First-level cache.
    #[serde(default = "Config::default_l1")]
    pub l1: LevelConfig,
    /// Optional second-level cache (disabled when size or ways is 0).
    #[serde(default)]
    pub l2: LevelConfig,
    /// Prefetcher parameters (echoed only).
    #[serde(default)]
    pub prefetch: PrefetchConfig,
    /// LRU bookkeeping mechanism applied to every level.
    #[serde(default)]
    pub recency: RecencyTracking,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block_size: Self::default_block_size(),
            l1: Self::default_l1(),
            l2: LevelConfig::default(),
            prefetch: PrefetchConfig::default(),
            recency: RecencyTracking::default(),
        }
    }
}

impl Config {
    const fn default_block_size() -> usize {
        defaults::BLOCK_SIZE
    }

    const fn default_l1() -> LevelConfig {
        LevelConfig {
            size_bytes: defaults::L1_SIZE,
            ways: defaults::L1_WAYS,
        }
    }

    /// Builds a configuration from the positional command-line parameters.
    pub const fn from_params(
        block_size: usize,
        l1_size: usize,
        l1_ways: usize,
        l2_size: usize,
        l2_ways: usize,
        pref_n: u32,
        pref_m: u32,
    ) -> Self {
        Self {
            block_size,
            l1: LevelConfig {
                size_bytes: l1_size,
                ways: l1_ways,
            },
            l2: LevelConfig {
                size_bytes: l2_size,
                ways: l2_ways,
            },
            prefetch: PrefetchConfig {
                n: pref_n,
                m: pref_m,
            },
            recency: RecencyTracking::Age,
        }
    }

    /// Parses a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Json`] if the JSON is malformed.
    pub fn from_json_str(json: &str) -> Result<Self, SimError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Open`] if the file cannot be read and
    /// [`SimError::Json`] if its contents are malformed.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, SimError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SimError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Level configuration for L1.
    pub fn l1_cache(&self) -> CacheConfig {
        CacheConfig::new("L1", self.l1.size_bytes, self.l1.ways, self.block_size)
            .with_recency(self.recency)
    }

    /// Level configuration for L2, or `None` when the level is disabled.
    pub fn l2_cache(&self) -> Option<CacheConfig> {
        self.l2.is_enabled().then(|| {
            CacheConfig::new("L2", self.l2.size_bytes, self.l2.ways, self.block_size)
                .with_recency(self.recency)
        })
    }
}
