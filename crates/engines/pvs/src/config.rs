//! Engine configuration.
//!
//! Loaded from TOML (every field optional) and validated up front. The UCI
//! `setoption` path builds a candidate config and runs the same
//! [`EngineConfig::validate`], so a bad value is rejected the same way
//! regardless of where it came from.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::score::MAX_DEPTH;

pub const HASH_MIN_MB: usize = 1;
pub const HASH_MAX_MB: usize = 32_768;
pub const HASH_DEFAULT_MB: usize = 16;

pub const THREADS_MIN: usize = 1;
pub const THREADS_MAX: usize = 256;

pub const MOVE_OVERHEAD_MAX_MS: u64 = 5_000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be within {min}..={max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
    #[error("failed to read config file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Transposition table size in MiB.
    pub hash_mb: usize,
    /// Search threads (1 = single-threaded).
    pub threads: usize,
    /// Milliseconds reserved per move for GUI and transport lag.
    pub move_overhead_ms: u64,
    /// Depth used when `go` carries no limit at all.
    pub default_depth: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hash_mb: HASH_DEFAULT_MB,
            threads: 1,
            move_overhead_ms: 30,
            default_depth: 12,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Rejects out-of-range values; nothing is clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("hash_mb", self.hash_mb as i64, HASH_MIN_MB as i64, HASH_MAX_MB as i64)?;
        check_range("threads", self.threads as i64, THREADS_MIN as i64, THREADS_MAX as i64)?;
        check_range(
            "move_overhead_ms",
            self.move_overhead_ms.min(i64::MAX as u64) as i64,
            0,
            MOVE_OVERHEAD_MAX_MS as i64,
        )?;
        check_range("default_depth", self.default_depth as i64, 1, MAX_DEPTH as i64)
    }
}

pub(crate) fn check_range(
    field: &'static str,
    value: i64,
    min: i64,
    max: i64,
) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
