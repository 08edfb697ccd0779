//! In-memory backends
//!
//! HashMap-backed adapters for both capabilities. Each carries switches that
//! make writes, deletions or unlinks report failure, which is how tests
//! exercise the engine's best-effort paths.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{FileSystem, KeyValueStore};

// == Memory Store ==
/// Key-value store kept in process memory.
///
/// Keys resolve as `"{prefix}{id}"`; an empty id resolves to nothing.
#[derive(Debug)]
pub struct MemoryStore {
    prefix: String,
    records: RwLock<HashMap<String, String>>,
    fail_writes: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryStore {
    /// Creates an empty store resolving keys under `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            records: RwLock::new(HashMap::new()),
            fail_writes: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
        }
    }

    /// Stores a raw record directly, bypassing the engine.
    pub async fn insert_raw(&self, key: impl Into<String>, raw: impl Into<String>) {
        self.records.write().await.insert(key.into(), raw.into());
    }

    /// Returns the raw record under `key`, if any.
    pub async fn raw(&self, key: &str) -> Option<String> {
        self.records.read().await.get(key).cloned()
    }

    pub async fn contains_key(&self, key: &str) -> bool {
        self.records.read().await.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// When set, every `set` reports `false` without storing anything.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// When set, every `delete` reports `false` without removing anything.
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    type Params = str;

    async fn resolve_key(&self, id: &str) -> anyhow::Result<Option<String>> {
        if id.is_empty() {
            return Ok(None);
        }
        Ok(Some(format!("{}{}", self.prefix, id)))
    }

    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        Ok(self.raw(key).await)
    }

    async fn set(&self, key: &str, value: String) -> anyhow::Result<bool> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Ok(false);
        }
        self.records.write().await.insert(key.to_string(), value);
        Ok(true)
    }

    async fn delete(&self, key: &str) -> anyhow::Result<bool> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Ok(false);
        }
        Ok(self.records.write().await.remove(key).is_some())
    }

    async fn list_all_keys(&self) -> anyhow::Result<Vec<String>> {
        Ok(self.records.read().await.keys().cloned().collect())
    }
}

// == Memory File System ==
/// Filesystem of named files with sizes, kept in process memory.
#[derive(Debug, Default)]
pub struct MemoryFileSystem {
    files: RwLock<HashMap<String, u64>>,
    fail_unlinks: AtomicBool,
}

impl MemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates (or resizes) the file at `path`.
    pub async fn add_file(&self, path: impl Into<String>, size: u64) {
        self.files.write().await.insert(path.into(), size);
    }

    pub async fn contains(&self, path: &str) -> bool {
        self.files.read().await.contains_key(path)
    }

    /// When set, every `unlink` reports `false` and leaves the file in place.
    pub fn set_fail_unlinks(&self, fail: bool) {
        self.fail_unlinks.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl FileSystem for MemoryFileSystem {
    async fn exists(&self, path: &str) -> anyhow::Result<bool> {
        Ok(self.contains(path).await)
    }

    async fn unlink(&self, path: &str) -> anyhow::Result<bool> {
        if self.fail_unlinks.load(Ordering::SeqCst) {
            return Ok(false);
        }
        Ok(self.files.write().await.remove(path).is_some())
    }

    async fn size(&self, path: &str) -> anyhow::Result<u64> {
        self.files
            .read()
            .await
            .get(path)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("no such file: {}", path))
    }
}
