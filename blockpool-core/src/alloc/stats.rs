//! ## blockpool-core::alloc::stats
//! **Allocation statistics and tracking**
//!
//! This module provides counters for allocator activity and a plain snapshot
//! type that callers can log, serialize or feed into a metrics exporter.

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

/// Running counters for a single pool.
///
/// Uses atomics so counters can be read through a shared reference while the
/// pool itself is borrowed elsewhere.
#[derive(Debug)]
pub struct MemoryStats {
    allocations: AtomicUsize,
    deallocations: AtomicUsize,
    failed_allocations: AtomicUsize,
    resets: AtomicUsize,
    peak_used: AtomicUsize,
}

impl MemoryStats {
    /// Creates a new `MemoryStats` instance with all counters initialized to zero.
    pub fn new() -> Self {
        MemoryStats {
            allocations: AtomicUsize::new(0),
            deallocations: AtomicUsize::new(0),
            failed_allocations: AtomicUsize::new(0),
            resets: AtomicUsize::new(0),
            peak_used: AtomicUsize::new(0),
        }
    }

    /// Counts a successful allocation and folds `used` into the peak.
    #[inline]
    pub fn record_allocation(&self, used: usize) {
        self.allocations.fetch_add(1, Ordering::Relaxed);
        self.peak_used.fetch_max(used, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_deallocations(&self) {
        self.deallocations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_failed_allocations(&self) {
        self.failed_allocations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_resets(&self) {
        self.resets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn allocations(&self) -> usize {
        self.allocations.load(Ordering::Relaxed)
    }

    pub fn deallocations(&self) -> usize {
        self.deallocations.load(Ordering::Relaxed)
    }

    pub fn failed_allocations(&self) -> usize {
        self.failed_allocations.load(Ordering::Relaxed)
    }

    pub fn resets(&self) -> usize {
        self.resets.load(Ordering::Relaxed)
    }

    /// Highest number of bytes allocated at once since construction.
    pub fn peak_used(&self) -> usize {
        self.peak_used.load(Ordering::Relaxed)
    }
}

impl Default for MemoryStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of a pool's occupancy and counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PoolStats {
    pub capacity: usize,
    pub used: usize,
    pub available: usize,
    pub largest_free: usize,
    pub free_blocks: usize,
    pub allocated_blocks: usize,
    /// `1 - largest_free / available`, 0.0 when nothing is free.
    pub fragmentation: f64,
    pub allocations: usize,
    pub deallocations: usize,
    pub failed_allocations: usize,
    pub resets: usize,
    pub peak_used: usize,
}
