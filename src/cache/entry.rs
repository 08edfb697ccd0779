//! Cache Entry Module
//!
//! Defines the stored record for a cached file and its wire codec.
//!
//! Records are JSON objects `{"filePath": string, "lastAccessed": integer}`.
//! Unknown fields are ignored on decode so records written by newer versions
//! still load.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::Result;

// == Codec Error ==
/// Why a raw record was rejected.
#[derive(Error, Debug)]
pub enum CodecError {
    /// Not JSON, or fields missing or of the wrong type
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),

    /// `lastAccessed` must be strictly positive
    #[error("lastAccessed must be positive")]
    NonPositiveTimestamp,
}

// == Cache Entry ==
/// A cached file and the time it was last handed out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Location of the cached file
    pub file_path: String,
    /// Last access timestamp (Unix milliseconds)
    pub last_accessed: u64,
}

impl Entry {
    // == Constructor ==
    /// Creates a new entry accessed at `now_ms`.
    pub fn new(file_path: impl Into<String>, now_ms: u64) -> Self {
        Self {
            file_path: file_path.into(),
            last_accessed: now_ms,
        }
    }

    // == Codec ==
    /// Serializes the entry to its wire form.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses and validates a raw record.
    pub fn decode(raw: &str) -> std::result::Result<Self, CodecError> {
        let entry: Entry = serde_json::from_str(raw)?;
        if entry.last_accessed == 0 {
            return Err(CodecError::NonPositiveTimestamp);
        }
        Ok(entry)
    }

    // == Is Expired ==
    /// Checks whether the entry was last accessed more than
    /// `eviction_millis` before `now_ms`.
    ///
    /// Boundary condition: an entry accessed exactly `eviction_millis` ago
    /// is still live.
    pub fn is_expired(&self, now_ms: u64, eviction_millis: u64) -> bool {
        self.last_accessed < now_ms.saturating_sub(eviction_millis)
    }

    // == Touch ==
    /// Returns a copy accessed at `now_ms`.
    pub fn touched(&self, now_ms: u64) -> Self {
        Self {
            file_path: self.file_path.clone(),
            last_accessed: now_ms,
        }
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
///
/// Never 0, so a freshly written record always passes `decode`.
pub fn current_timestamp_ms() -> u64 {
    clamp_timestamp(chrono::Utc::now().timestamp_millis())
}

/// A clock at or before the epoch reads as 1ms.
fn clamp_timestamp(millis: i64) -> u64 {
    u64::try_from(millis).unwrap_or(0).max(1)
}
