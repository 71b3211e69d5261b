//! # Blockpool Telemetry
//!
//! Crate for logging and metrics around the pool allocator.

pub mod logging;
pub mod metrics;

pub use logging::PoolLogger;
pub use metrics::MetricsRecorder;
