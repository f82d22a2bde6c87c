//! spireg command-line tool
//!
//! Runs transaction scripts, built-in scenarios, and exhaustive frame sweeps
//! against the simulated SPI register peripheral. Exits non-zero when an
//! expectation fails.

mod args;

use std::process::ExitCode;

use clap::Parser;
use spireg_bench::{ALL_SCENARIOS, Bench, BenchConfig, ScriptReport, Sweep, scenario};
use tracing::{error, info};

use args::{Args, Command};

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match args.command {
        Command::Run {
            script,
            trace,
            timing,
            json,
        } => {
            let loaded = spireg_bench::Script::load(&script)?;
            let mut bench = Bench::new(timing.to_config(trace.is_some()))?;
            info!("Running {}", script.display());
            let result = loaded.run(&mut bench);
            if let (Some(path), Some(recorded)) = (trace, bench.trace()) {
                recorded.save_csv(&path)?;
                info!("Trace written to {}", path.display());
            }
            finish(result, json)
        },
        Command::Scenario {
            name,
            list,
            timing,
            json,
        } => {
            if list {
                for s in ALL_SCENARIOS.iter() {
                    println!("{:<20} {}", s.name, s.description);
                }
                return Ok(ExitCode::SUCCESS);
            }
            let Some(name) = name else {
                return Ok(ExitCode::FAILURE);
            };
            let mut bench = Bench::new(timing.to_config(false))?;
            finish(scenario(&name)?.run(&mut bench), json)
        },
        Command::Sweep {
            half_period,
            first_address,
            last_address,
            parallel,
        } => {
            let config = BenchConfig::fast().with_half_period(half_period);
            let report = Sweep::new(config)
                .with_addresses(first_address..=last_address)
                .with_parallel(parallel)
                .run()?;
            print!("{report}");
            Ok(if report.passed() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        },
    }
}

/// Prints a script report, or logs the failure and returns a failing exit code.
fn finish(
    result: Result<ScriptReport, spireg_bench::BenchError>,
    json: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match result {
        Ok(report) if json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(ExitCode::SUCCESS)
        },
        Ok(report) => {
            println!(
                "{}: {} steps, {} checks, {} writes, {} ticks",
                report.name.as_deref().unwrap_or("script"),
                report.steps,
                report.checks,
                report.writes.len(),
                report.ticks
            );
            println!("{}", report.registers);
            Ok(ExitCode::SUCCESS)
        },
        Err(e @ spireg_bench::BenchError::Expectation { .. }) => {
            error!("{e}");
            eprintln!("FAILED: {e}");
            Ok(ExitCode::FAILURE)
        },
        Err(e) => Err(e.into()),
    }
}
