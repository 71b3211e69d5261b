//! ## blockpool-core::alloc::shared
//! **Mutex-guarded pool for multi-threaded callers**
//!
//! `PoolAllocator` is single-owner. When several threads need one pool,
//! `SharedPool` serializes every call behind a single `parking_lot::Mutex`
//! that guards the whole pool state.

use std::sync::Arc;

use parking_lot::Mutex;

use super::block::Handle;
use super::pool::PoolAllocator;
use super::stats::PoolStats;
use crate::error::PoolError;

/// Cloneable handle to a pool shared between threads.
#[derive(Clone, Debug)]
pub struct SharedPool {
    inner: Arc<Mutex<PoolAllocator>>,
}

impl SharedPool {
    pub fn new(pool: PoolAllocator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(pool)),
        }
    }

    pub fn allocate(&self, size: usize) -> Result<Handle, PoolError> {
        self.inner.lock().allocate(size)
    }

    pub fn free(&self, handle: Handle) -> Result<(), PoolError> {
        self.inner.lock().free(handle)
    }

    pub fn free_zeroed(&self, handle: Handle) -> Result<(), PoolError> {
        self.inner.lock().free_zeroed(handle)
    }

    pub fn reset(&self) {
        self.inner.lock().reset()
    }

    pub fn stats(&self) -> PoolStats {
        self.inner.lock().stats()
    }

    /// Runs `f` with exclusive access, for work that spans several calls
    /// (e.g. allocate then fill the block).
    pub fn with<R>(&self, f: impl FnOnce(&mut PoolAllocator) -> R) -> R {
        let mut pool = self.inner.lock();
        f(&mut pool)
    }
}

impl From<PoolAllocator> for SharedPool {
    fn from(pool: PoolAllocator) -> Self {
        Self::new(pool)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_shared_pool_across_threads() {
        let shared = SharedPool::new(PoolAllocator::new(4096).unwrap());

        let workers: Vec<_> = (0..4u8)
            .map(|id| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        let handle = shared
                            .with(|pool| {
                                let handle = pool.allocate(16)?;
                                pool.bytes_mut(handle)?.fill(id);
                                Ok::<_, PoolError>(handle)
                            })
                            .unwrap();
                        shared.with(|pool| {
                            assert!(pool.bytes(handle).unwrap().iter().all(|&b| b == id));
                        });
                        shared.free(handle).unwrap();
                    }
                })
            })
            .collect();

        for worker in workers {
            worker.join().unwrap();
        }

        let stats = shared.stats();
        assert_eq!(stats.used, 0);
        assert_eq!(stats.free_blocks, 1);
        assert_eq!(stats.allocations, 400);
        assert_eq!(stats.deallocations, 400);
        shared.with(|pool| pool.check_invariants());
    }

    #[test]
    fn test_shared_pool_reset() {
        let shared: SharedPool = PoolAllocator::new(64).unwrap().into();
        let handle = shared.allocate(32).unwrap();
        shared.reset();
        assert_eq!(shared.free(handle), Err(PoolError::InvalidHandle(handle)));
        assert_eq!(shared.stats().largest_free, 64);
    }
}
