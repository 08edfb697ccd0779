//! Cache Store Module
//!
//! The file cache engine: request-facing operations over an injected
//! key-value store and filesystem, with accounting counters kept in memory.
//!
//! Every public operation first waits for the one-time boot scan. Mutating
//! operations then run one at a time per instance; collaborator calls are
//! still awaited in between, but no two operations interleave.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

use crate::backends::{FileSystem, KeyValueStore};
use crate::cache::boot::{self, BootState};
use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheStats, Counters, Entry, StatsRecorder};
use crate::config::Config;
use crate::error::{CacheError, Result};

// == Cache Core ==
/// State shared between the engine handle and its boot task.
pub(crate) struct CacheCore<S, F> {
    pub(super) config: Config,
    pub(super) store: S,
    pub(super) fs: F,
    pub(super) counters: Counters,
    pub(super) stats: StatsRecorder,
    /// Held for the whole of each mutating public operation
    pub(super) op_lock: Mutex<()>,
}

impl<S: KeyValueStore, F: FileSystem> CacheCore<S, F> {
    /// Lists the keys carrying this cache's prefix.
    pub(super) async fn owned_keys(&self) -> Result<Vec<String>> {
        let prefix = self.config.prefix.as_str();
        let keys = self.store.list_all_keys().await?;
        Ok(keys.into_iter().filter(|k| k.starts_with(prefix)).collect())
    }

    /// Deletes a key whose record is unusable; the entry count drops only if
    /// the store confirms the deletion.
    pub(super) async fn purge(&self, key: &str) -> Result<bool> {
        let deleted = self.store.delete(key).await?;
        if deleted {
            self.counters.remove_entries(1);
        } else {
            warn!(key = %key, "Store refused to delete unusable record");
        }
        Ok(deleted)
    }

    async fn lookup(&self, params: &S::Params) -> Result<Option<String>> {
        let Some(key) = self.store.resolve_key(params).await? else {
            return Ok(None);
        };
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(None);
        };

        // Disk size is left alone on both purges below: the size of a corrupt
        // record is unknown, and a missing file was never counted.
        let entry = match Entry::decode(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key = %key, error = %e, "Purging corrupt record");
                self.purge(&key).await?;
                return Ok(None);
            }
        };
        if !self.fs.exists(&entry.file_path).await? {
            debug!(key = %key, path = %entry.file_path, "Purging record with missing file");
            self.purge(&key).await?;
            return Ok(None);
        }

        let now = current_timestamp_ms();
        if self.evict_if_expired(&key, &entry, now).await? {
            return Ok(None);
        }

        let refreshed = entry.touched(now);
        if !self.store.set(&key, refreshed.encode()?).await? {
            warn!(key = %key, "Failed to refresh last access time");
        }
        Ok(Some(refreshed.file_path))
    }

    async fn insert(&self, params: &S::Params, file_path: &str) -> Result<bool> {
        let Some(key) = self.store.resolve_key(params).await? else {
            return Ok(false);
        };

        let entry = Entry::new(file_path, current_timestamp_ms());
        if !self.store.set(&key, entry.encode()?).await? {
            warn!(key = %key, "Store rejected write");
            return Ok(false);
        }

        // Overwrites count as inserts too; the previous record is not
        // inspected.
        self.counters.add_entries(1);
        if self.fs.exists(file_path).await? {
            let size = self.fs.size(file_path).await?;
            self.counters.add_disk(size);
        }
        debug!(key = %key, path = %file_path, "Cached file");

        if self.counters.entries() >= self.config.max_entries {
            self.evict_by_count().await?;
        }
        if self.counters.disk_size() >= self.config.max_cache_size {
            self.evict_by_size().await?;
        }
        Ok(true)
    }

    async fn remove(&self, params: &S::Params) -> Result<bool> {
        let Some(key) = self.store.resolve_key(params).await? else {
            return Ok(false);
        };
        let Some(raw) = self.store.get(&key).await? else {
            return Ok(false);
        };
        if !self.store.delete(&key).await? {
            warn!(key = %key, "Store refused deletion");
            return Ok(false);
        }
        self.counters.remove_entries(1);

        // The key is gone either way; an unreadable record just means the
        // file cannot be located.
        match Entry::decode(&raw) {
            Ok(entry) => self.unlink_file(&entry.file_path).await?,
            Err(e) => debug!(key = %key, error = %e, "Deleted corrupt record"),
        }
        Ok(true)
    }

    /// Unlinks the file if present, releasing its size from the disk total
    /// only when the unlink succeeds.
    pub(super) async fn unlink_file(&self, path: &str) -> Result<()> {
        if !self.fs.exists(path).await? {
            return Ok(());
        }
        let size = self.fs.size(path).await?;
        if self.fs.unlink(path).await? {
            self.counters.remove_disk(size);
        } else {
            warn!(path = %path, "Failed to unlink cached file");
        }
        Ok(())
    }
}

// == File Cache ==
/// Accounting and eviction engine for files tracked in a key-value store.
///
/// Cloning yields another handle to the same engine.
pub struct FileCache<S, F> {
    core: Arc<CacheCore<S, F>>,
    boot: watch::Receiver<BootState>,
}

impl<S, F> Clone for FileCache<S, F> {
    fn clone(&self) -> Self {
        Self {
            core: Arc::clone(&self.core),
            boot: self.boot.clone(),
        }
    }
}

impl<S: KeyValueStore, F: FileSystem> FileCache<S, F> {
    // == Constructor ==
    /// Creates the engine and starts its boot scan in the background.
    ///
    /// Fails with [`CacheError::Boot`] when called outside a Tokio runtime.
    pub fn new(config: Config, store: S, fs: F) -> Result<Self> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|e| {
            CacheError::Boot(format!("no Tokio runtime to run the boot scan: {}", e))
        })?;
        let core = Arc::new(CacheCore {
            config,
            store,
            fs,
            counters: Counters::new(),
            stats: StatsRecorder::new(),
            op_lock: Mutex::new(()),
        });
        let boot = boot::spawn_boot(&runtime, Arc::clone(&core));
        Ok(Self { core, boot })
    }

    pub fn config(&self) -> &Config {
        &self.core.config
    }

    pub fn store(&self) -> &S {
        &self.core.store
    }

    pub fn file_system(&self) -> &F {
        &self.core.fs
    }

    /// Current boot state, without waiting.
    pub fn boot_state(&self) -> BootState {
        self.boot.borrow().clone()
    }

    /// Waits until the boot scan has finished.
    pub async fn wait_until_ready(&self) -> Result<()> {
        boot::wait_for_boot(&self.boot).await
    }

    // == Get ==
    /// Looks up the file cached for `params`, refreshing its access time.
    ///
    /// Corrupt records, records whose file is gone, and expired entries are
    /// removed on the way and reported as a miss.
    pub async fn get(&self, params: &S::Params) -> Result<Option<String>> {
        self.wait_until_ready().await?;
        let _guard = self.core.op_lock.lock().await;

        let found = self.core.lookup(params).await?;
        match found {
            Some(_) => self.core.stats.record_hit(),
            None => self.core.stats.record_miss(),
        }
        Ok(found)
    }

    // == Put ==
    /// Records `file_path` as the cached file for `params`.
    ///
    /// Returns `false` if no key resolves or the store rejects the write, in
    /// which case no counter changes. May run count- or size-based cleanup.
    pub async fn put(&self, params: &S::Params, file_path: &str) -> Result<bool> {
        self.wait_until_ready().await?;
        let _guard = self.core.op_lock.lock().await;
        self.core.insert(params, file_path).await
    }

    // == Delete ==
    /// Removes the entry for `params` and unlinks its file.
    ///
    /// Returns `false` if there is no such entry or the store refuses the
    /// deletion.
    pub async fn delete(&self, params: &S::Params) -> Result<bool> {
        self.wait_until_ready().await?;
        let _guard = self.core.op_lock.lock().await;
        self.core.remove(params).await
    }

    // == Clean Expired ==
    /// Evicts every expired entry, checking all candidates concurrently.
    ///
    /// Returns whether anything was evicted.
    pub async fn clean_expired_entries(&self) -> Result<bool> {
        self.wait_until_ready().await?;
        let _guard = self.core.op_lock.lock().await;
        self.core.clean_expired().await
    }

    // == Counters ==
    pub async fn current_entries_count(&self) -> Result<u64> {
        self.wait_until_ready().await?;
        Ok(self.core.counters.entries())
    }

    pub async fn current_disk_size(&self) -> Result<u64> {
        self.wait_until_ready().await?;
        Ok(self.core.counters.disk_size())
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> Result<CacheStats> {
        self.wait_until_ready().await?;
        let counters = &self.core.counters;
        Ok(self
            .core
            .stats
            .snapshot(counters.entries(), counters.disk_size()))
    }
}
