//! Accounting counters
//!
//! Running totals of entries and bytes owned by the cache. They are updated
//! incrementally after each collaborator call and may drift from the
//! backing stores; they are approximate by contract. Decrements clamp at
//! zero.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Counters {
    entries: AtomicU64,
    disk_size: AtomicU64,
}

impl Counters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> u64 {
        self.entries.load(Ordering::SeqCst)
    }

    pub fn disk_size(&self) -> u64 {
        self.disk_size.load(Ordering::SeqCst)
    }

    /// Replaces both totals, as the boot scan does once.
    pub fn reset(&self, entries: u64, disk_size: u64) {
        self.entries.store(entries, Ordering::SeqCst);
        self.disk_size.store(disk_size, Ordering::SeqCst);
    }

    pub fn add_entries(&self, n: u64) {
        add(&self.entries, n);
    }

    pub fn remove_entries(&self, n: u64) {
        subtract(&self.entries, n);
    }

    pub fn add_disk(&self, bytes: u64) {
        add(&self.disk_size, bytes);
    }

    pub fn remove_disk(&self, bytes: u64) {
        subtract(&self.disk_size, bytes);
    }
}

fn add(counter: &AtomicU64, n: u64) {
    // Infallible: the closure always returns Some.
    let _ = counter.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| {
        Some(v.saturating_add(n))
    });
}

/// A decrement that would go below zero leaves the counter at zero.
fn subtract(counter: &AtomicU64, n: u64) {
    // Infallible: the closure always returns Some.
    let _ = counter.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |v| {
        Some(v.saturating_sub(n))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let counters = Counters::new();
        assert_eq!(counters.entries(), 0);
        assert_eq!(counters.disk_size(), 0);
    }

    #[test]
    fn test_add_and_remove() {
        let counters = Counters::new();
        counters.add_entries(2);
        counters.add_disk(1234);
        counters.remove_entries(1);
        counters.remove_disk(234);

        assert_eq!(counters.entries(), 1);
        assert_eq!(counters.disk_size(), 1000);
    }

    #[test]
    fn test_decrement_below_zero_clamps_to_zero() {
        let counters = Counters::new();
        counters.remove_entries(1);
        assert_eq!(counters.entries(), 0);

        counters.add_disk(10);
        counters.remove_disk(500);
        assert_eq!(counters.disk_size(), 0);
    }

    #[test]
    fn test_reset() {
        let counters = Counters::new();
        counters.add_entries(9);
        counters.reset(3, 300);
        assert_eq!(counters.entries(), 3);
        assert_eq!(counters.disk_size(), 300);
    }
}
