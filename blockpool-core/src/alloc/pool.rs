//! ## blockpool-core::alloc::pool
//! **Best-fit pool allocator with eager coalescing**
//!
//! The pool owns one contiguous byte region and never grows. Every byte of it
//! belongs to exactly one block, free or allocated. Two indexes are kept in
//! lockstep:
//!
//! - `blocks`: every block keyed by offset, the partition of the pool
//! - `free_by_size`: free blocks keyed by `(len, offset)`, for best-fit lookup
//!
//! Allocation takes the first entry of `free_by_size` at or above the request,
//! which is the smallest fitting block with the lowest offset among equals.
//! Release merges the block with a free predecessor and/or successor, so two
//! free blocks are never adjacent.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use super::block::{Block, Handle};
use super::stats::{MemoryStats, PoolStats};
use crate::error::PoolError;

/// Default pool size: 64 KiB.
pub const DEFAULT_CAPACITY: usize = 64 * 1024;

pub struct PoolAllocator {
    memory: Box<[u8]>,
    blocks: BTreeMap<usize, Block>,
    free_by_size: BTreeSet<(usize, usize)>,
    used: usize,
    zero_on_free: bool,
    stats: MemoryStats,
}

impl PoolAllocator {
    /// Reserves a zeroed region of `capacity` bytes as a single free block.
    pub fn new(capacity: usize) -> Result<Self, PoolError> {
        if capacity == 0 {
            return Err(PoolError::InvalidCapacity(capacity));
        }

        let mut pool = Self {
            memory: vec![0u8; capacity].into_boxed_slice(),
            blocks: BTreeMap::new(),
            free_by_size: BTreeSet::new(),
            used: 0,
            zero_on_free: false,
            stats: MemoryStats::new(),
        };
        pool.insert_free(Block::free(0, capacity));

        info!(capacity, "Memory pool initialized: {} bytes", capacity);
        Ok(pool)
    }

    /// Zero block contents on every [`free`](Self::free), not just
    /// [`free_zeroed`](Self::free_zeroed).
    pub fn zero_on_free(mut self, enabled: bool) -> Self {
        self.zero_on_free = enabled;
        self
    }

    /// Allocates `size` bytes and returns the handle of the new block.
    ///
    /// Fails without touching the pool when `size` is zero or no free block
    /// is large enough.
    pub fn allocate(&mut self, size: usize) -> Result<Handle, PoolError> {
        if size == 0 {
            self.stats.increment_failed_allocations();
            warn!(size, "allocate: invalid size");
            return Err(PoolError::InvalidSize(size));
        }

        let Some(&(len, offset)) = self.free_by_size.range((size, 0)..).next() else {
            let largest_free = self.largest_free();
            self.stats.increment_failed_allocations();
            warn!(requested = size, largest_free, "allocate: out of memory");
            return Err(PoolError::OutOfMemory {
                requested: size,
                largest_free,
            });
        };

        self.free_by_size.remove(&(len, offset));
        self.blocks.insert(offset, Block::allocated(offset, size));
        if len > size {
            self.insert_free(Block::free(offset + size, len - size));
        }

        self.used += size;
        self.stats.record_allocation(self.used);
        debug!(offset, size, split_from = len, "allocated block");
        Ok(Handle::from_offset(offset))
    }

    /// Releases the block behind `handle` and merges it with free neighbours.
    pub fn free(&mut self, handle: Handle) -> Result<(), PoolError> {
        self.release(handle, self.zero_on_free)
    }

    /// Like [`free`](Self::free) but always zeroes the block first.
    pub fn free_zeroed(&mut self, handle: Handle) -> Result<(), PoolError> {
        self.release(handle, true)
    }

    /// Returns the pool to a single free block covering the whole region.
    ///
    /// Outstanding handles become invalid and memory is zeroed, so the pool is
    /// indistinguishable from a freshly constructed one apart from its
    /// running counters.
    pub fn reset(&mut self) {
        let capacity = self.capacity();
        self.memory.fill(0);
        self.blocks.clear();
        self.free_by_size.clear();
        self.used = 0;
        self.insert_free(Block::free(0, capacity));
        self.stats.increment_resets();
        info!(capacity, "Memory pool reset");
    }

    /// Contents of an allocated block.
    pub fn bytes(&self, handle: Handle) -> Result<&[u8], PoolError> {
        let block = self.allocated_block(handle)?;
        Ok(&self.memory[block.range()])
    }

    /// Mutable contents of an allocated block.
    pub fn bytes_mut(&mut self, handle: Handle) -> Result<&mut [u8], PoolError> {
        let block = self.allocated_block(handle)?;
        Ok(&mut self.memory[block.range()])
    }

    /// Length in bytes of the block behind `handle`.
    pub fn block_len(&self, handle: Handle) -> Result<usize, PoolError> {
        self.allocated_block(handle).map(|block| block.len())
    }

    pub fn capacity(&self) -> usize {
        self.memory.len()
    }

    pub fn used(&self) -> usize {
        self.used
    }

    pub fn available(&self) -> usize {
        self.capacity() - self.used
    }

    /// Size of the biggest request that would currently succeed.
    pub fn largest_free(&self) -> usize {
        self.free_by_size
            .last()
            .map(|&(len, _)| len)
            .unwrap_or(0)
    }

    pub fn free_block_count(&self) -> usize {
        self.free_by_size.len()
    }

    pub fn allocated_block_count(&self) -> usize {
        self.blocks.len() - self.free_by_size.len()
    }

    /// Share of free space that is not part of the largest free block.
    pub fn fragmentation(&self) -> f64 {
        let available = self.available();
        if available == 0 {
            return 0.0;
        }
        1.0 - self.largest_free() as f64 / available as f64
    }

    /// Every block of the pool in offset order.
    pub fn blocks(&self) -> impl Iterator<Item = Block> + '_ {
        self.blocks.values().copied()
    }

    /// Free blocks in offset order.
    pub fn free_blocks(&self) -> impl Iterator<Item = Block> + '_ {
        self.blocks().filter(Block::is_free)
    }

    pub fn memory_stats(&self) -> &MemoryStats {
        &self.stats
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            capacity: self.capacity(),
            used: self.used,
            available: self.available(),
            largest_free: self.largest_free(),
            free_blocks: self.free_block_count(),
            allocated_blocks: self.allocated_block_count(),
            fragmentation: self.fragmentation(),
            allocations: self.stats.allocations(),
            deallocations: self.stats.deallocations(),
            failed_allocations: self.stats.failed_allocations(),
            resets: self.stats.resets(),
            peak_used: self.stats.peak_used(),
        }
    }

    /// Verifies the block map and the free registry.
    ///
    /// # Panics
    ///
    /// If blocks leave a gap or overlap, two free blocks are adjacent, or the
    /// registry disagrees with the block map. Any of these is a bug in the
    /// allocator, never a caller error.
    pub fn check_invariants(&self) {
        let mut expected_offset = 0;
        let mut previous_free = false;
        let mut free_count = 0;
        let mut used = 0;

        for (&offset, block) in &self.blocks {
            assert_eq!(offset, block.offset(), "block keyed under wrong offset");
            assert_eq!(
                block.offset(),
                expected_offset,
                "gap or overlap at offset {}",
                expected_offset
            );
            assert!(!block.is_empty(), "zero-length block at {}", offset);

            if block.is_free() {
                assert!(!previous_free, "adjacent free blocks at {}", offset);
                assert!(
                    self.free_by_size.contains(&(block.len(), offset)),
                    "free block {} missing from registry",
                    block
                );
                free_count += 1;
            } else {
                used += block.len();
            }

            previous_free = block.is_free();
            expected_offset = block.end();
        }

        assert_eq!(expected_offset, self.capacity(), "blocks do not cover pool");
        assert_eq!(free_count, self.free_by_size.len(), "stale registry entries");
        assert_eq!(used, self.used, "used byte count drifted");
    }

    fn allocated_block(&self, handle: Handle) -> Result<Block, PoolError> {
        match self.blocks.get(&handle.offset()) {
            Some(block) if block.is_allocated() => Ok(*block),
            _ => Err(PoolError::InvalidHandle(handle)),
        }
    }

    fn release(&mut self, handle: Handle, zero: bool) -> Result<(), PoolError> {
        let block = match self.allocated_block(handle) {
            Ok(block) => block,
            Err(err) => {
                warn!(%handle, "free: handle does not reference an allocated block");
                return Err(err);
            }
        };

        if zero {
            self.memory[block.range()].fill(0);
        }

        self.blocks.remove(&block.offset());
        self.used -= block.len();

        let mut start = block.offset();
        let mut len = block.len();

        let previous = self.blocks.range(..start).next_back().map(|(_, b)| *b);
        if let Some(previous) = previous.filter(Block::is_free) {
            self.remove_free(previous);
            start = previous.offset();
            len += previous.len();
        }

        if let Some(next) = self.blocks.get(&block.end()).copied().filter(Block::is_free) {
            self.remove_free(next);
            len += next.len();
        }

        self.insert_free(Block::free(start, len));
        self.stats.increment_deallocations();
        debug!(
            offset = block.offset(),
            size = block.len(),
            merged_offset = start,
            merged_len = len,
            "freed block"
        );
        Ok(())
    }

    fn insert_free(&mut self, block: Block) {
        self.free_by_size.insert((block.len(), block.offset()));
        self.blocks.insert(block.offset(), block);
    }

    fn remove_free(&mut self, block: Block) {
        self.free_by_size.remove(&(block.len(), block.offset()));
        self.blocks.remove(&block.offset());
    }
}

impl std::fmt::Debug for PoolAllocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolAllocator")
            .field("capacity", &self.capacity())
            .field("used", &self.used)
            .field("blocks", &self.blocks.values().collect::<Vec<_>>())
            .field("zero_on_free", &self.zero_on_free)
            .finish()
    }
}
