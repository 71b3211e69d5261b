//! ## blockpool-telemetry::logging
//! **Structured logging with `tracing`**
//!
//! Installs a global fmt subscriber. `RUST_LOG` wins when set; otherwise the
//! configured level applies to every target.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone)]
pub struct PoolLogger;

impl PoolLogger {
    /// Installs the subscriber. Later calls are ignored, so tests and
    /// binaries may both call it.
    pub fn init(default_level: &str) {
        let _ = fmt()
            .with_env_filter(Self::filter(default_level))
            .with_thread_names(true)
            .with_span_events(FmtSpan::CLOSE)
            .try_init();
    }

    fn filter(default_level: &str) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
    }

    /// Logs a one-line summary of a pool's occupancy.
    pub fn log_stats(label: &str, stats: &blockpool_core::alloc::PoolStats) {
        tracing::info!(
            label,
            capacity = stats.capacity,
            used = stats.used,
            largest_free = stats.largest_free,
            free_blocks = stats.free_blocks,
            fragmentation = stats.fragmentation,
            "Pool stats"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockpool_core::PoolAllocator;
    use tracing_test::traced_test;

    #[traced_test]
    #[test]
    fn test_log_stats() {
        let mut pool = PoolAllocator::new(256).unwrap();
        pool.allocate(64).unwrap();
        PoolLogger::log_stats("after_alloc", &pool.stats());
        assert!(logs_contain("Pool stats"));
        assert!(logs_contain("used=64"));
    }
}
