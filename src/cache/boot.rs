//! Boot Sequencer
//!
//! One-time scan that reconciles the in-memory counters with whatever the
//! backing store holds when the engine starts, dropping records that are
//! corrupt or point at files that no longer exist.
//!
//! The scan runs in a single spawned task. Its outcome is published on a
//! watch channel that every operation waits on, so callers arriving before
//! the scan finishes share that one scan.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::backends::{FileSystem, KeyValueStore};
use crate::cache::store::CacheCore;
use crate::cache::Entry;
use crate::error::{CacheError, Result};

// == Boot State ==
/// Lifecycle of the boot scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootState {
    /// Scan still running
    Pending,
    /// Counters reconciled; operations may proceed
    Ready,
    /// Scan hit a collaborator fault; every operation fails
    Failed(String),
}

/// Outcome of a successful scan.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(super) struct BootSummary {
    pub entries: u64,
    pub disk_size: u64,
    pub purged: u64,
}

impl<S: KeyValueStore, F: FileSystem> CacheCore<S, F> {
    /// Walks every owned key and resets the counters to what survives.
    ///
    /// Purged records were never counted, so purges here touch no counter.
    pub(super) async fn boot_scan(&self) -> Result<BootSummary> {
        let mut summary = BootSummary::default();

        for key in self.owned_keys().await? {
            let Some(raw) = self.store.get(&key).await? else {
                continue;
            };

            let entry = match Entry::decode(&raw) {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(key = %key, error = %e, "Purging corrupt record during boot");
                    self.store.delete(&key).await?;
                    summary.purged += 1;
                    continue;
                }
            };

            if !self.fs.exists(&entry.file_path).await? {
                debug!(key = %key, path = %entry.file_path, "Purging orphaned record during boot");
                self.store.delete(&key).await?;
                summary.purged += 1;
                continue;
            }

            summary.disk_size += self.fs.size(&entry.file_path).await?;
            summary.entries += 1;
        }

        self.counters.reset(summary.entries, summary.disk_size);
        Ok(summary)
    }
}

/// Starts the boot scan and returns the channel its outcome is published on.
pub(super) fn spawn_boot<S, F>(
    runtime: &Handle,
    core: Arc<CacheCore<S, F>>,
) -> watch::Receiver<BootState>
where
    S: KeyValueStore,
    F: FileSystem,
{
    let (tx, rx) = watch::channel(BootState::Pending);

    runtime.spawn(async move {
        let state = match core.boot_scan().await {
            Ok(summary) => {
                info!(
                    entries = summary.entries,
                    disk_size = summary.disk_size,
                    purged = summary.purged,
                    "Cache boot scan complete"
                );
                BootState::Ready
            }
            Err(e) => {
                error!(error = %e, "Cache boot scan failed");
                BootState::Failed(e.to_string())
            }
        };
        tx.send_replace(state);
    });

    rx
}

/// Waits for the boot outcome published on `boot`.
pub(super) async fn wait_for_boot(boot: &watch::Receiver<BootState>) -> Result<()> {
    let mut rx = boot.clone();
    let state = rx
        .wait_for(|state| *state != BootState::Pending)
        .await
        .map_err(|_| CacheError::Boot("boot task ended without reporting".to_string()))?;

    if let BootState::Failed(reason) = &*state {
        return Err(CacheError::Boot(reason.clone()));
    }
    Ok(())
}
