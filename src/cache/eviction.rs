//! Eviction Policies
//!
//! Age, count and size based cleanup. All three remove entries through the
//! same age check, so count and size limits only ever shed entries that are
//! also past `eviction_millis`. While every entry is younger than that, the
//! limits can be exceeded.

use futures::future::try_join_all;
use tracing::{debug, info, warn};

use crate::backends::{FileSystem, KeyValueStore};
use crate::cache::entry::current_timestamp_ms;
use crate::cache::store::CacheCore;
use crate::cache::{Counters, Entry};
use crate::error::Result;

impl<S: KeyValueStore, F: FileSystem> CacheCore<S, F> {
    // == Age Eviction ==
    /// Evicts `entry` if it was last accessed more than `eviction_millis`
    /// before `now_ms`.
    ///
    /// Returns whether the entry was expired. Counters and the eviction
    /// stat only move for the parts the collaborators confirm.
    pub(super) async fn evict_if_expired(
        &self,
        key: &str,
        entry: &Entry,
        now_ms: u64,
    ) -> Result<bool> {
        if !entry.is_expired(now_ms, self.config.eviction_millis) {
            return Ok(false);
        }

        if self.store.delete(key).await? {
            self.counters.remove_entries(1);
            self.stats.record_eviction();
            debug!(key = %key, path = %entry.file_path, "Evicted expired entry");
        } else {
            warn!(key = %key, "Store refused to delete expired entry");
        }
        self.unlink_file(&entry.file_path).await?;
        Ok(true)
    }

    // == Oldest First ==
    /// Loads every owned entry, least recently accessed first.
    ///
    /// Corrupt records found on the way are purged; keys that vanished
    /// between listing and loading are skipped.
    pub(super) async fn oldest_first(&self) -> Result<Vec<(String, Entry)>> {
        let mut candidates = Vec::new();

        for key in self.owned_keys().await? {
            let Some(raw) = self.store.get(&key).await? else {
                continue;
            };
            match Entry::decode(&raw) {
                Ok(entry) => candidates.push((key, entry)),
                Err(e) => {
                    warn!(key = %key, error = %e, "Purging corrupt record");
                    self.purge(&key).await?;
                }
            }
        }

        candidates.sort_by_key(|(_, entry)| entry.last_accessed);
        Ok(candidates)
    }

    // == Clean Expired ==
    /// Runs the age check against every owned entry concurrently.
    pub(super) async fn clean_expired(&self) -> Result<bool> {
        let now = current_timestamp_ms();
        let candidates = self.oldest_first().await?;

        let mut sweeps = Vec::with_capacity(candidates.len());
        for (key, entry) in &candidates {
            sweeps.push(self.evict_if_expired(key, entry, now));
        }
        let outcomes = try_join_all(sweeps).await?;

        let evicted = outcomes.iter().filter(|evicted| **evicted).count();
        if evicted > 0 {
            info!(evicted, "Expiry sweep removed entries");
        } else {
            debug!("Expiry sweep found no expired entries");
        }
        Ok(evicted > 0)
    }

    // == Count / Size Cleanup ==
    /// Walks entries oldest first until the entry count is within
    /// `max_entries`.
    pub(super) async fn evict_by_count(&self) -> Result<u64> {
        let max_entries = self.config.max_entries;
        let evicted = self
            .evict_oldest_until(|counters| counters.entries() <= max_entries)
            .await?;

        if self.counters.entries() > max_entries {
            debug!(
                entries = self.counters.entries(),
                max_entries, "Entry limit still exceeded, no older entries to evict"
            );
        }
        Ok(evicted)
    }

    /// Walks entries oldest first until the disk total is within
    /// `max_cache_size`.
    pub(super) async fn evict_by_size(&self) -> Result<u64> {
        let max_cache_size = self.config.max_cache_size;
        let evicted = self
            .evict_oldest_until(|counters| counters.disk_size() <= max_cache_size)
            .await?;

        if self.counters.disk_size() > max_cache_size {
            debug!(
                disk_size = self.counters.disk_size(),
                max_cache_size, "Size limit still exceeded, no older entries to evict"
            );
        }
        Ok(evicted)
    }

    /// Sequentially applies the age check oldest first, stopping once
    /// `within_limit` holds or the entries run out.
    async fn evict_oldest_until<P>(&self, within_limit: P) -> Result<u64>
    where
        P: Fn(&Counters) -> bool,
    {
        let now = current_timestamp_ms();
        let mut evicted = 0;

        for (key, entry) in self.oldest_first().await? {
            if within_limit(&self.counters) {
                break;
            }
            if self.evict_if_expired(&key, &entry, now).await? {
                evicted += 1;
            }
        }
        Ok(evicted)
    }
}
