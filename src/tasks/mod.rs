//! Background Tasks Module
//!
//! Contains background tasks that run periodically alongside a cache.
//!
//! # Tasks
//! - Expiry sweep: evicts expired entries at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
