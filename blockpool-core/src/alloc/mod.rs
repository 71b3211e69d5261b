//! ## blockpool-core::alloc
//! **Fixed-capacity pool allocation**
//!
//! ### Expectations:
//! - No heap traffic after construction beyond block-map bookkeeping
//! - O(log n) allocate and free in the number of blocks
//! - Deterministic placement for reproducible layouts
//!
//! ### Key Submodules:
//! - `block/`: Handles and the block model that partitions the pool
//! - `pool/`: The best-fit allocator with coalescing
//! - `shared/`: Mutex-guarded wrapper for multi-threaded callers
//! - `stats/`: Allocation counters and point-in-time snapshots

pub mod block;
pub mod pool;
pub mod shared;
pub mod stats;

pub use block::{Block, BlockState, Handle};
pub use pool::{PoolAllocator, DEFAULT_CAPACITY};
pub use shared::SharedPool;
pub use stats::{MemoryStats, PoolStats};
