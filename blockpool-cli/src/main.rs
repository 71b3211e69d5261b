//! ## blockpool-cli
//! **Command-line driver for the pool allocator**
//!
//! Runs a scripted walkthrough of split and coalesce behaviour, or a seeded
//! random workload that checks the block invariants after every step.

use clap::Parser;

mod commands;
mod error;

use commands::Cli;

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    commands::run_command(cli)?;
    Ok(())
}
