//! Timing configuration for the bench.
//!
//! Defaults reproduce the reference test bench: a 10 MHz system clock driving
//! a 100 kHz serial clock (50 ticks per half period), 600 idle ticks after
//! every transaction, and 5 ticks of reset followed by 5 idle ticks.

use contracts::*;
use serde::{Deserialize, Serialize};
use spireg_core::EDGE_LATENCY;

use crate::BenchError;

/// Default ticks per serial-clock half period.
pub const DEFAULT_HALF_PERIOD: u32 = 50;
/// Default idle ticks after chip-select is released.
pub const DEFAULT_SETTLE_TICKS: u32 = 600;
/// Default ticks reset is held for.
pub const DEFAULT_RESET_TICKS: u32 = 5;

/// Largest serial-clock half period the controller will build a waveform for.
pub const MAX_HALF_PERIOD: u32 = 100_000;
/// Largest settle time the controller will build a waveform for.
pub const MAX_SETTLE_TICKS: u32 = 10_000_000;

/// Fewest idle ticks after a transaction for its write to have landed:
/// the chip-select edge latency, the close tick, and the commit tick.
pub const MIN_SETTLE_TICKS: u32 = EDGE_LATENCY + 2;

/// Bench timing and recording options.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Ticks per serial-clock half period.
    pub half_period: u32,
    /// Idle ticks after chip-select is released.
    pub settle_ticks: u32,
    /// Ticks reset is held for, also the idle ticks that follow it.
    pub reset_ticks: u32,
    /// Whether to record a per-tick trace.
    pub record_trace: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            half_period: DEFAULT_HALF_PERIOD,
            settle_ticks: DEFAULT_SETTLE_TICKS,
            reset_ticks: DEFAULT_RESET_TICKS,
            record_trace: false,
        }
    }
}

impl BenchConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A fast configuration for exhaustive runs: the tightest timing the
    /// peripheral still decodes.
    #[must_use]
    pub fn fast() -> Self {
        Self::new()
            .with_half_period(1)
            .with_settle_ticks(MIN_SETTLE_TICKS)
            .with_reset_ticks(1)
    }

    /// Sets the serial-clock half period in ticks.
    #[must_use]
    #[ensures(ret.half_period == half_period)]
    pub fn with_half_period(mut self, half_period: u32) -> Self {
        self.half_period = half_period;
        self
    }

    /// Sets the idle ticks after each transaction.
    #[must_use]
    #[ensures(ret.settle_ticks == settle_ticks)]
    pub fn with_settle_ticks(mut self, settle_ticks: u32) -> Self {
        self.settle_ticks = settle_ticks;
        self
    }

    /// Sets how long reset is held.
    #[must_use]
    #[ensures(ret.reset_ticks == reset_ticks)]
    pub fn with_reset_ticks(mut self, reset_ticks: u32) -> Self {
        self.reset_ticks = reset_ticks;
        self
    }

    /// Enables or disables per-tick tracing.
    #[must_use]
    #[ensures(ret.record_trace == record_trace)]
    pub fn with_record_trace(mut self, record_trace: bool) -> Self {
        self.record_trace = record_trace;
        self
    }

    /// Checks that the timing can carry a frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the half period or settle time is zero, too
    /// short to commit, or too long to build a waveform for, or if reset is
    /// never asserted.
    pub fn validate(&self) -> Result<(), BenchError> {
        if self.half_period == 0 {
            return Err(BenchError::invalid_config("half period must be at least 1 tick"));
        }
        if self.half_period > MAX_HALF_PERIOD {
            return Err(BenchError::invalid_config(format!(
                "half period must be at most {MAX_HALF_PERIOD} ticks, got {}",
                self.half_period
            )));
        }
        if self.settle_ticks < MIN_SETTLE_TICKS {
            return Err(BenchError::invalid_config(format!(
                "settle time must be at least {MIN_SETTLE_TICKS} ticks, got {}",
                self.settle_ticks
            )));
        }
        if self.settle_ticks > MAX_SETTLE_TICKS {
            return Err(BenchError::invalid_config(format!(
                "settle time must be at most {MAX_SETTLE_TICKS} ticks, got {}",
                self.settle_ticks
            )));
        }
        if self.reset_ticks == 0 {
            return Err(BenchError::invalid_config("reset must be held for at least 1 tick"));
        }
        Ok(())
    }

    /// Ticks one full transaction occupies, settle time included.
    #[must_use]
    pub fn transaction_ticks(&self) -> u64 {
        1 + u64::from(spireg_core::FRAME_BITS) * 2 * u64::from(self.half_period)
            + u64::from(self.settle_ticks)
    }
}
