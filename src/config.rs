//! Configuration Module
//!
//! Handles loading and validating cache engine configuration.

use std::env;

use crate::error::{CacheError, Result};

/// Cache engine configuration parameters.
///
/// Immutable for the lifetime of a [`FileCache`](crate::cache::FileCache).
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Key prefix identifying entries owned by this cache instance
    pub prefix: String,
    /// Maximum entry age in milliseconds since last access
    pub eviction_millis: u64,
    /// Entry count at which count-based cleanup runs
    pub max_entries: u64,
    /// Total file size in bytes at which size-based cleanup runs
    pub max_cache_size: u64,
    /// Interval in seconds between periodic expiry sweeps
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_PREFIX` - Key prefix (default: `cache:`)
    /// - `EVICTION_MILLIS` - Maximum entry age in ms (default: 86400000)
    /// - `MAX_ENTRIES` - Entry count limit (default: 1000)
    /// - `MAX_CACHE_SIZE` - Disk size limit in bytes (default: 1 GiB)
    /// - `CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            prefix: env::var("CACHE_PREFIX").unwrap_or(defaults.prefix),
            eviction_millis: env::var("EVICTION_MILLIS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.eviction_millis),
            max_entries: env::var("MAX_ENTRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_entries),
            max_cache_size: env::var("MAX_CACHE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_cache_size),
            cleanup_interval: env::var("CLEANUP_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.cleanup_interval),
        }
    }

    /// Rejects configurations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.prefix.is_empty() {
            return Err(CacheError::InvalidConfig(
                "prefix cannot be empty".to_string(),
            ));
        }
        for (name, value) in [
            ("eviction_millis", self.eviction_millis),
            ("max_entries", self.max_entries),
            ("max_cache_size", self.max_cache_size),
        ] {
            if value == 0 {
                return Err(CacheError::InvalidConfig(format!(
                    "{} must be positive",
                    name
                )));
            }
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            prefix: "cache:".to_string(),
            eviction_millis: 24 * 60 * 60 * 1000,
            max_entries: 1000,
            max_cache_size: 1024 * 1024 * 1024,
            cleanup_interval: 60,
        }
    }
}
