//! Expiry Sweep Task
//!
//! Background task that periodically evicts expired cache entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::backends::{FileSystem, KeyValueStore};
use crate::cache::FileCache;

/// Spawns a background task that periodically runs
/// [`FileCache::clean_expired_entries`].
///
/// The task runs in an infinite loop, sleeping for the specified interval
/// between sweeps. A failed sweep is logged and the loop carries on.
///
/// # Arguments
/// * `cache` - Handle to the cache to sweep
/// * `cleanup_interval_secs` - Interval in seconds between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during shutdown.
///
/// # Example
/// ```ignore
/// let cache = FileCache::new(config, store, LocalFileSystem::new())?;
/// let cleanup_handle = spawn_cleanup_task(cache.clone(), 60);
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task<S, F>(
    cache: FileCache<S, F>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()>
where
    S: KeyValueStore,
    F: FileSystem,
{
    let interval = Duration::from_secs(cleanup_interval_secs);

    tokio::spawn(async move {
        info!(
            "Starting expiry sweep task with interval of {} seconds",
            cleanup_interval_secs
        );

        loop {
            // Sleep for the configured interval
            tokio::time::sleep(interval).await;

            match cache.clean_expired_entries().await {
                Ok(true) => info!("Expiry sweep evicted entries"),
                Ok(false) => debug!("Expiry sweep: no expired entries found"),
                Err(e) => warn!(error = %e, "Expiry sweep failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::{MemoryFileSystem, MemoryStore};
    use crate::cache::{current_timestamp_ms, Entry};
    use crate::config::Config;

    fn config() -> Config {
        Config {
            prefix: "IMG".to_string(),
            eviction_millis: 60_000,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let store = MemoryStore::new("IMG");
        let stale = current_timestamp_ms() - 120_000;
        store
            .insert_raw("IMGold", Entry::new("/old", stale).encode().unwrap())
            .await;
        let fs = MemoryFileSystem::new();
        fs.add_file("/old", 8).await;
        let cache = FileCache::new(config(), store, fs).unwrap();

        // Spawn cleanup task with 1 second interval
        let handle = spawn_cleanup_task(cache.clone(), 1);

        // Wait for the sweep to run
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(!cache.store().contains_key("IMGold").await);
        assert!(!cache.file_system().contains("/old").await);
        assert_eq!(cache.current_entries_count().await.unwrap(), 0);

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_valid_entries() {
        let cache = FileCache::new(config(), MemoryStore::new("IMG"), MemoryFileSystem::new())
            .unwrap();
        cache.file_system().add_file("/fresh", 8).await;
        cache.put("fresh", "/fresh").await.unwrap();

        let handle = spawn_cleanup_task(cache.clone(), 1);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert_eq!(cache.get("fresh").await.unwrap(), Some("/fresh".to_string()));

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let cache = FileCache::new(config(), MemoryStore::new("IMG"), MemoryFileSystem::new())
            .unwrap();

        let handle = spawn_cleanup_task(cache, 1);

        // Abort immediately
        handle.abort();

        // Wait a bit and verify task is finished
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
