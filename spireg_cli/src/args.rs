use std::path::PathBuf;

use clap::{Parser, Subcommand};
use spireg_bench::{BenchConfig, DEFAULT_HALF_PERIOD, DEFAULT_SETTLE_TICKS};

/// spireg - drive the SPI register peripheral from the host
#[derive(Parser, Debug)]
#[command(name = "spireg")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// What to run
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a JSON transaction script
    Run {
        /// Path to the script
        script: PathBuf,
        /// Write a per-tick trace to this CSV file
        #[arg(long)]
        trace: Option<PathBuf>,
        #[command(flatten)]
        timing: Timing,
        /// Print the report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Run a built-in scenario
    Scenario {
        /// Scenario name
        #[arg(required_unless_present = "list")]
        name: Option<String>,
        /// List the built-in scenarios
        #[arg(short, long, default_value_t = false)]
        list: bool,
        #[command(flatten)]
        timing: Timing,
        /// Print the report as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Send every frame in a range to a fresh peripheral and check the result
    Sweep {
        /// Ticks per serial-clock half period
        #[arg(long, default_value_t = 1)]
        half_period: u32,
        /// First address
        #[arg(long, default_value_t = 0)]
        first_address: u8,
        /// Last address
        #[arg(long, default_value_t = 0x7f)]
        last_address: u8,
        /// Enable parallel execution
        #[arg(short = 'p', long, default_value_t = false)]
        parallel: bool,
    },
}

/// Bench timing shared by the script-driven subcommands.
#[derive(clap::Args, Debug, Clone, Copy)]
pub struct Timing {
    /// Ticks per serial-clock half period
    #[arg(long, default_value_t = DEFAULT_HALF_PERIOD)]
    pub half_period: u32,
    /// Idle ticks after each transaction
    #[arg(long, default_value_t = DEFAULT_SETTLE_TICKS)]
    pub settle: u32,
}

impl Timing {
    /// Convert command-line arguments into a bench configuration
    pub fn to_config(self, record_trace: bool) -> BenchConfig {
        BenchConfig::new()
            .with_half_period(self.half_period)
            .with_settle_ticks(self.settle)
            .with_record_trace(record_trace)
    }
}
