//! # blockpool-core
//!
//! Bounded pool allocator over a single pre-reserved byte region.
//! Built for callers that need per-request buffers with a hard upper bound
//! on the memory they can take.
//!
//! ### Guarantees:
//! - Capacity fixed at construction, the pool never grows
//! - Best-fit placement, lowest offset wins ties
//! - Eager coalescing of adjacent free blocks on release
//! - Callers hold opaque offset handles, never pool memory
//!
//! ### Key Submodules:
//! - `alloc`: The allocator, its block model, shared wrapper and statistics
//! - `error`: Error kinds returned by every fallible operation
//!
//! ### Concurrency:
//! `PoolAllocator` has a single logical owner and mutates through `&mut self`.
//! Use `alloc::SharedPool` when several threads need the same pool; it guards
//! the whole pool state with one mutex.

pub mod alloc;
pub mod error;

pub mod prelude {
    pub use crate::alloc::*;
    pub use crate::error::*;
}

pub use alloc::{Handle, PoolAllocator, SharedPool};
pub use error::PoolError;
