//! ## blockpool-telemetry::metrics
//! **Prometheus exporter for pool activity**
//!
//! Counters mirror the pool's running totals; gauges mirror its occupancy at
//! the last `record` call.

use blockpool_core::alloc::PoolStats;
use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder};

#[derive(Debug, Clone)]
pub struct MetricsRecorder {
    pub registry: Registry,
    pub allocations: IntCounter,
    pub frees: IntCounter,
    pub failed_allocations: IntCounter,
    pub used_bytes: IntGauge,
    pub free_blocks: IntGauge,
    pub largest_free_bytes: IntGauge,
    pub allocation_size: Histogram,
}

impl MetricsRecorder {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let allocations =
            IntCounter::new("blockpool_allocations_total", "Successful pool allocations")?;
        let frees = IntCounter::new("blockpool_frees_total", "Blocks returned to the pool")?;
        let failed_allocations = IntCounter::new(
            "blockpool_failed_allocations_total",
            "Allocations rejected for size or exhaustion",
        )?;
        let used_bytes = IntGauge::new("blockpool_used_bytes", "Bytes currently allocated")?;
        let free_blocks = IntGauge::new("blockpool_free_blocks", "Number of free blocks")?;
        let largest_free_bytes = IntGauge::new(
            "blockpool_largest_free_bytes",
            "Largest request that would currently succeed",
        )?;
        let allocation_size = Histogram::with_opts(
            HistogramOpts::new(
                "blockpool_allocation_size_bytes",
                "Requested allocation sizes",
            )
            .buckets(prometheus::exponential_buckets(16.0, 4.0, 7)?),
        )?;

        registry.register(Box::new(allocations.clone()))?;
        registry.register(Box::new(frees.clone()))?;
        registry.register(Box::new(failed_allocations.clone()))?;
        registry.register(Box::new(used_bytes.clone()))?;
        registry.register(Box::new(free_blocks.clone()))?;
        registry.register(Box::new(largest_free_bytes.clone()))?;
        registry.register(Box::new(allocation_size.clone()))?;

        Ok(Self {
            registry,
            allocations,
            frees,
            failed_allocations,
            used_bytes,
            free_blocks,
            largest_free_bytes,
            allocation_size,
        })
    }

    /// Records the size of a single allocation request.
    pub fn observe_allocation_size(&self, size: usize) {
        self.allocation_size.observe(size as f64);
    }

    /// Brings counters and gauges in line with a pool snapshot.
    pub fn record(&self, stats: &PoolStats) {
        advance(&self.allocations, stats.allocations);
        advance(&self.frees, stats.deallocations);
        advance(&self.failed_allocations, stats.failed_allocations);
        self.used_bytes.set(stats.used as i64);
        self.free_blocks.set(stats.free_blocks as i64);
        self.largest_free_bytes.set(stats.largest_free as i64);
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Counters only move forward; catch up to `total` if it is ahead.
fn advance(counter: &IntCounter, total: usize) {
    let total = total as u64;
    let current = counter.get();
    if total > current {
        counter.inc_by(total - current);
    }
}
