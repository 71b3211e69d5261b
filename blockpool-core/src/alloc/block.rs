//! ## blockpool-core::alloc::block
//! **Handles and blocks**
//!
//! A pool is carved into blocks that cover `[0, capacity)` end to end.
//! Callers only ever see a `Handle`, the offset of an allocated block.

use std::fmt;
use std::ops::Range;

use serde::Serialize;

/// Opaque reference to an allocated block.
///
/// A handle is the block's starting offset inside the pool. It does not keep
/// the block alive: after the block is freed the handle is stale and the pool
/// rejects it with `PoolError::InvalidHandle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Handle(usize);

impl Handle {
    /// Rebuilds a handle from an offset previously obtained via [`Handle::offset`].
    #[inline]
    pub fn from_offset(offset: usize) -> Self {
        Handle(offset)
    }

    /// Offset of the block inside the pool.
    #[inline]
    pub fn offset(self) -> usize {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockState {
    Free,
    Allocated,
}

/// A contiguous `[offset, offset + len)` range of the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Block {
    offset: usize,
    len: usize,
    state: BlockState,
}

impl Block {
    #[inline]
    pub(crate) fn free(offset: usize, len: usize) -> Self {
        Block {
            offset,
            len,
            state: BlockState::Free,
        }
    }

    #[inline]
    pub(crate) fn allocated(offset: usize, len: usize) -> Self {
        Block {
            offset,
            len,
            state: BlockState::Allocated,
        }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false for blocks held by a pool; zero-length blocks are never created.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// One past the last byte of the block.
    #[inline]
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    #[inline]
    pub fn state(&self) -> BlockState {
        self.state
    }

    #[inline]
    pub fn is_free(&self) -> bool {
        self.state == BlockState::Free
    }

    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.state == BlockState::Allocated
    }

    #[inline]
    pub fn range(&self) -> Range<usize> {
        self.offset..self.end()
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.state {
            BlockState::Free => "free",
            BlockState::Allocated => "used",
        };
        write!(f, "[{}, {}) {}", self.offset, self.end(), tag)
    }
}
