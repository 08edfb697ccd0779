//! Backends Module
//!
//! Capabilities the cache engine depends on but does not implement: a
//! key-value store holding serialized entries and a filesystem holding the
//! cached files.
//!
//! Expected failures are typed (`None`, `false`). An `Err` means the
//! collaborator itself broke; the engine propagates it to the caller of the
//! public operation.
//!
//! # Adapters
//! - [`MemoryStore`] / [`MemoryFileSystem`] - in-process, for tests and embedding
//! - [`LocalFileSystem`] - the real filesystem through `tokio::fs`

mod local;
mod memory;

use async_trait::async_trait;

pub use local::LocalFileSystem;
pub use memory::{MemoryFileSystem, MemoryStore};

/// Persistent key-value storage for serialized entries.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Caller-supplied parameters a key is derived from.
    type Params: ?Sized + Sync;

    /// Derives the storage key for `params`, or `None` if no key applies.
    async fn resolve_key(&self, params: &Self::Params) -> anyhow::Result<Option<String>>;

    /// Loads the raw record stored under `key`.
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>>;

    /// Stores `value` under `key`, reporting whether the write succeeded.
    async fn set(&self, key: &str, value: String) -> anyhow::Result<bool>;

    /// Removes `key`, reporting whether the deletion succeeded.
    async fn delete(&self, key: &str) -> anyhow::Result<bool>;

    /// Lists every key in the store, in no particular order.
    ///
    /// May include keys that belong to other users of the same store.
    async fn list_all_keys(&self) -> anyhow::Result<Vec<String>>;
}

/// Filesystem holding the files entries point at.
#[async_trait]
pub trait FileSystem: Send + Sync + 'static {
    async fn exists(&self, path: &str) -> anyhow::Result<bool>;

    /// Removes the file, reporting whether it was removed.
    async fn unlink(&self, path: &str) -> anyhow::Result<bool>;

    /// Size of the file in bytes.
    async fn size(&self, path: &str) -> anyhow::Result<u64>;
}
