use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use blockpool_config::BlockpoolConfig;
use blockpool_core::alloc::{Handle, PoolAllocator, PoolStats};
use blockpool_core::PoolError;
use blockpool_telemetry::{MetricsRecorder, PoolLogger};

use crate::error::CliError;

#[derive(Parser)]
#[command(version, about)]
pub struct Cli {
    /// Configuration file (defaults to config/blockpool.yaml and BLOCKPOOL_* variables)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Walk through allocation, splitting and coalescing on a small pool
    Demo(DemoArgs),
    /// Run a seeded random allocate/free workload against the configured pool
    Stress(StressArgs),
}

#[derive(Args, Debug, Clone)]
pub struct DemoArgs {
    /// Pool capacity for the walkthrough (1 byte to 1 GiB)
    #[arg(long, default_value_t = 100, value_parser = parse_capacity)]
    pub capacity: usize,
}

#[derive(Args, Debug, Clone)]
pub struct StressArgs {
    #[arg(long, default_value_t = 0)]
    pub seed: u64,
    /// Number of allocate/free operations
    #[arg(long, default_value_t = 10_000)]
    pub iterations: usize,
    /// Largest single allocation request in bytes
    #[arg(long, default_value_t = 512)]
    pub max_size: usize,
    /// Print the prometheus exposition after the run
    #[arg(long)]
    pub metrics: bool,
}

/// Largest pool the CLI will reserve, matching the config bound.
pub const MAX_CAPACITY: usize = 1 << 30;

fn parse_capacity(value: &str) -> Result<usize, String> {
    let capacity: usize = value.parse().map_err(|e| format!("{}", e))?;
    if (1..=MAX_CAPACITY).contains(&capacity) {
        Ok(capacity)
    } else {
        Err(format!("capacity must be between 1 and {}", MAX_CAPACITY))
    }
}

pub fn run_command(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => BlockpoolConfig::load_from_path(path)?,
        None => BlockpoolConfig::load()?,
    };
    PoolLogger::init(&config.telemetry.log_level);

    match cli.command {
        Commands::Demo(args) => {
            for line in run_demo(args.capacity, &config)? {
                println!("{}", line);
            }
        }
        Commands::Stress(args) => {
            let metrics = MetricsRecorder::new()?;
            let stats = run_stress(&args, &config, &metrics)?;
            print!("{}", serde_yaml::to_string(&stats)?);
            if args.metrics && config.telemetry.metrics.enabled {
                print!("{}", metrics.gather_metrics()?);
            }
        }
    }
    Ok(())
}

/// Runs the walkthrough and returns one line per step.
///
/// Expected failures (exhaustion, double free) are reported in the output
/// rather than returned as errors.
pub fn run_demo(capacity: usize, config: &BlockpoolConfig) -> Result<Vec<String>, CliError> {
    if capacity > MAX_CAPACITY {
        return Err(CliError::InvalidArgument(format!(
            "capacity {} exceeds {}",
            capacity, MAX_CAPACITY
        )));
    }
    let mut pool = PoolAllocator::new(capacity)?.zero_on_free(config.pool.zero_on_free);
    let mut lines = vec![format!("new({}) -> {}", capacity, layout(&pool))];

    let third = (capacity * 3 / 10).max(1);
    let fifth = (capacity / 5).max(1);

    let a = step(&mut pool, &mut lines, Step::Allocate(third));
    let b = step(&mut pool, &mut lines, Step::Allocate(fifth));
    if let Some(a) = a {
        step(&mut pool, &mut lines, Step::Free(a));
        step(&mut pool, &mut lines, Step::Free(a));
    }
    if let Some(b) = b {
        step(&mut pool, &mut lines, Step::Free(b));
    }

    let big = step(&mut pool, &mut lines, Step::Allocate(capacity * 6 / 10));
    step(&mut pool, &mut lines, Step::Allocate(capacity / 2));
    if let Some(big) = big {
        step(&mut pool, &mut lines, Step::Free(big));
    }

    pool.reset();
    lines.push(format!("reset() -> {}", layout(&pool)));
    pool.check_invariants();
    Ok(lines)
}

enum Step {
    Allocate(usize),
    Free(Handle),
}

fn step(pool: &mut PoolAllocator, lines: &mut Vec<String>, step: Step) -> Option<Handle> {
    let (call, outcome, handle) = match step {
        Step::Allocate(size) => match pool.allocate(size) {
            Ok(handle) => (format!("allocate({})", size), handle.to_string(), Some(handle)),
            Err(err) => (format!("allocate({})", size), err.to_string(), None),
        },
        Step::Free(handle) => match pool.free(handle) {
            Ok(()) => (format!("free({})", handle), "ok".to_string(), None),
            Err(err) => (format!("free({})", handle), err.to_string(), None),
        },
    };
    pool.check_invariants();
    lines.push(format!("{} -> {} | {}", call, outcome, layout(pool)));
    handle
}

fn layout(pool: &PoolAllocator) -> String {
    pool.blocks()
        .map(|block| block.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Drives a seeded random workload, checking invariants after every step.
pub fn run_stress(
    args: &StressArgs,
    config: &BlockpoolConfig,
    metrics: &MetricsRecorder,
) -> Result<PoolStats, CliError> {
    if args.max_size == 0 {
        return Err(CliError::InvalidArgument(
            "--max-size must be greater than zero".into(),
        ));
    }

    let mut pool =
        PoolAllocator::new(config.pool.capacity)?.zero_on_free(config.pool.zero_on_free);
    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut live: Vec<Handle> = Vec::new();

    info!(
        seed = args.seed,
        iterations = args.iterations,
        capacity = config.pool.capacity,
        "Starting stress run"
    );

    for _ in 0..args.iterations {
        if live.is_empty() || rng.random_bool(0.55) {
            let size = rng.random_range(1..=args.max_size);
            metrics.observe_allocation_size(size);
            match pool.allocate(size) {
                Ok(handle) => live.push(handle),
                Err(PoolError::OutOfMemory { .. }) => {}
                Err(err) => return Err(err.into()),
            }
        } else {
            let handle = live.swap_remove(rng.random_range(0..live.len()));
            pool.free(handle)?;
        }
        pool.check_invariants();
    }

    let stats = pool.stats();
    if config.telemetry.metrics.enabled {
        metrics.record(&stats);
    }
    PoolLogger::log_stats("stress", &stats);
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_follows_split_and_coalesce() {
        let lines = run_demo(100, &BlockpoolConfig::default()).unwrap();
        assert_eq!(lines[0], "new(100) -> [0, 100) free");
        assert_eq!(lines[1], "allocate(30) -> @0 | [0, 30) used [30, 100) free");
        assert_eq!(
            lines[2],
            "allocate(20) -> @30 | [0, 30) used [30, 50) used [50, 100) free"
        );
        assert_eq!(
            lines[3],
            "free(@0) -> ok | [0, 30) free [30, 50) used [50, 100) free"
        );
        assert!(lines[4].starts_with("free(@0) -> Invalid handle"));
        assert_eq!(lines[5], "free(@30) -> ok | [0, 100) free");
        assert_eq!(lines[6], "allocate(60) -> @0 | [0, 60) used [60, 100) free");
        assert!(lines[7].starts_with("allocate(50) -> Out of memory"));
        assert_eq!(lines[8], "free(@0) -> ok | [0, 100) free");
        assert_eq!(lines[9], "reset() -> [0, 100) free");
    }

    #[test]
    fn demo_capacity_is_bounded() {
        assert_eq!(parse_capacity("100"), Ok(100));
        assert_eq!(parse_capacity("1073741824"), Ok(MAX_CAPACITY));
        assert!(parse_capacity("0").is_err());
        assert!(parse_capacity("1073741825").is_err());
        assert!(parse_capacity("100000000000000").is_err());

        let err = run_demo(MAX_CAPACITY + 1, &BlockpoolConfig::default()).unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));
    }

    #[test]
    fn demo_cli_rejects_huge_capacity() {
        let parsed = Cli::try_parse_from(["blockpool", "demo", "--capacity", "100000000000000"]);
        assert!(parsed.is_err());
        let parsed = Cli::try_parse_from(["blockpool", "demo", "--capacity", "64"]).unwrap();
        match parsed.command {
            Commands::Demo(args) => assert_eq!(args.capacity, 64),
            Commands::Stress(_) => panic!("expected demo command"),
        }
    }

    #[test]
    fn stress_is_deterministic_per_seed() {
        let args = StressArgs {
            seed: 42,
            iterations: 2_000,
            max_size: 256,
            metrics: false,
        };
        let mut config = BlockpoolConfig::default();
        config.pool.capacity = 4096;

        let first = run_stress(&args, &config, &MetricsRecorder::new().unwrap()).unwrap();
        let second = run_stress(&args, &config, &MetricsRecorder::new().unwrap()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.capacity, 4096);
        assert_eq!(first.used + first.available, 4096);
    }

    #[test]
    fn stress_records_metrics() {
        let args = StressArgs {
            seed: 1,
            iterations: 500,
            max_size: 64,
            metrics: true,
        };
        let metrics = MetricsRecorder::new().unwrap();
        let stats = run_stress(&args, &BlockpoolConfig::default(), &metrics).unwrap();
        assert_eq!(metrics.allocations.get(), stats.allocations as u64);
        assert_eq!(metrics.used_bytes.get(), stats.used as i64);
    }

    #[test]
    fn stress_rejects_zero_max_size() {
        let args = StressArgs {
            seed: 0,
            iterations: 1,
            max_size: 0,
            metrics: false,
        };
        let err = run_stress(
            &args,
            &BlockpoolConfig::default(),
            &MetricsRecorder::new().unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));
    }
}
