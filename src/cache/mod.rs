//! Cache Module
//!
//! Accounting and eviction for cached files tracked in an external
//! key-value store.

mod boot;
mod counters;
mod entry;
mod eviction;
mod stats;
mod store;


// Re-export public types
pub use boot::BootState;
pub use counters::Counters;
pub use entry::{current_timestamp_ms, CodecError, Entry};
pub use stats::{CacheStats, StatsRecorder};
pub use store::FileCache;
