//! File Cache - accounting and eviction for file-backed caches
//!
//! Keeps entry and byte counters for files tracked in an external key-value
//! store, and evicts entries by age, count and size.

pub mod backends;
pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use backends::{FileSystem, KeyValueStore};
pub use cache::{BootState, CacheStats, FileCache};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_cleanup_task;
