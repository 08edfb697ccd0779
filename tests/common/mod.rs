//! Shared collaborators for integration tests
//!
//! Wrappers around the in-memory backends that record calls or inject
//! faults.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use file_cache::backends::{FileSystem, KeyValueStore, MemoryFileSystem, MemoryStore};
use file_cache::cache::Entry;
use file_cache::Config;
use tracing_subscriber::EnvFilter;

pub const DAY_MS: u64 = 86_400_000;

/// Installs a test subscriber honouring `RUST_LOG`; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// The `IMG` configuration used throughout the scenarios.
pub fn img_config() -> Config {
    Config {
        prefix: "IMG".to_string(),
        eviction_millis: DAY_MS,
        max_entries: 100,
        max_cache_size: 10_000_000,
        cleanup_interval: 60,
    }
}

pub fn record(path: &str, last_accessed: u64) -> String {
    Entry::new(path, last_accessed).encode().unwrap()
}

// == Recording Store ==
/// Shared, ordered log of collaborator calls.
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// `MemoryStore` that logs every call by name.
pub struct RecordingStore {
    pub inner: MemoryStore,
    pub log: CallLog,
}

impl RecordingStore {
    pub fn new(prefix: &str) -> Self {
        Self {
            inner: MemoryStore::new(prefix),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn record(&self, call: &str) {
        self.log.lock().unwrap().push(call.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }
}

#[async_trait]
impl KeyValueStore for RecordingStore {
    type Params = str;

    async fn resolve_key(&self, id: &str) -> anyhow::Result<Option<String>> {
        self.record("resolve_key");
        self.inner.resolve_key(id).await
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        self.record("get");
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> anyhow::Result<bool> {
        self.record("set");
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> anyhow::Result<bool> {
        self.record("delete");
        self.inner.delete(key).await
    }

    async fn list_all_keys(&self) -> anyhow::Result<Vec<String>> {
        self.record("list_all_keys");
        self.inner.list_all_keys().await
    }
}

// == Faulty Store ==
/// Store whose listing or lookups fail outright.
pub struct FaultyStore {
    pub inner: MemoryStore,
    pub fail_listing: bool,
    pub fail_get: bool,
}

#[async_trait]
impl KeyValueStore for FaultyStore {
    type Params = str;

    async fn resolve_key(&self, id: &str) -> anyhow::Result<Option<String>> {
        self.inner.resolve_key(id).await
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        if self.fail_get {
            anyhow::bail!("connection reset while reading {}", key);
        }
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> anyhow::Result<bool> {
        self.inner.set(key, value).await
    }

    async fn delete(&self, key: &str) -> anyhow::Result<bool> {
        self.inner.delete(key).await
    }

    async fn list_all_keys(&self) -> anyhow::Result<Vec<String>> {
        if self.fail_listing {
            anyhow::bail!("store unavailable");
        }
        self.inner.list_all_keys().await
    }
}

// == Counting File System ==
/// `MemoryFileSystem` that counts unlink calls per path.
#[derive(Default)]
pub struct CountingFs {
    pub inner: MemoryFileSystem,
    unlinks: Mutex<HashMap<String, usize>>,
}

impl CountingFs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unlink_calls(&self, path: &str) -> usize {
        self.unlinks.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

#[async_trait]
impl FileSystem for CountingFs {
    async fn exists(&self, path: &str) -> anyhow::Result<bool> {
        self.inner.exists(path).await
    }

    async fn unlink(&self, path: &str) -> anyhow::Result<bool> {
        *self
            .unlinks
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_insert(0) += 1;
        self.inner.unlink(path).await
    }

    async fn size(&self, path: &str) -> anyhow::Result<u64> {
        self.inner.size(path).await
    }
}
