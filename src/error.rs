//! Error types for the cache engine
//!
//! Provides unified error handling using thiserror.
//!
//! Only unexpected faults travel through these types. Expected outcomes such
//! as a cache miss or a collaborator reporting `false` are plain
//! `Option`/`bool` results.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache engine.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A collaborator (key-value store or filesystem) failed unexpectedly
    #[error("Backend error: {0}")]
    Backend(#[from] anyhow::Error),

    /// The boot scan failed or never completed
    #[error("Boot failed: {0}")]
    Boot(String),

    /// Configuration rejected at construction
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A record could not be serialized
    #[error("Codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the cache engine.
pub type Result<T> = std::result::Result<T, CacheError>;
