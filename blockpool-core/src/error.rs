use thiserror::Error;

use crate::alloc::Handle;

/// Errors reported by the pool allocator.
///
/// None of these are fatal to the pool: a failed call leaves the pool exactly
/// as it was. Corruption of the block map is not represented here, it panics.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Invalid pool capacity: {0} (must be greater than zero)")]
    InvalidCapacity(usize),

    #[error("Invalid allocation size: {0} (must be greater than zero)")]
    InvalidSize(usize),

    #[error("Out of memory: requested {requested} bytes, largest free block is {largest_free} bytes")]
    OutOfMemory {
        requested: usize,
        largest_free: usize,
    },

    #[error("Invalid handle: {0} does not reference an allocated block")]
    InvalidHandle(Handle),
}
