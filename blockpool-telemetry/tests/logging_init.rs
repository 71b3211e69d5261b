//! Installs the global subscriber, so it runs in its own test binary.

use blockpool_core::PoolAllocator;
use blockpool_telemetry::PoolLogger;

#[test]
fn init_twice_is_harmless() {
    PoolLogger::init("debug");
    PoolLogger::init("info");

    let mut pool = PoolAllocator::new(64).unwrap();
    let handle = pool.allocate(16).unwrap();
    pool.free(handle).unwrap();
    PoolLogger::log_stats("after_init", &pool.stats());
}
