//! Exhaustive frame sweep.
//!
//! Every (address, data) pair is sent to a fresh peripheral. Mapped
//! addresses must produce exactly the expected write; unmapped addresses
//! must leave the bank untouched.

use std::ops::RangeInclusive;

use serde::Serialize;
use spireg_core::{Frame, MAX_ADDRESS, Register, RegisterBank, RegisterWrite};
use tracing::{info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{Bench, BenchConfig, BenchError};

/// A frame whose effect did not match its address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepMismatch {
    /// The frame that was sent.
    pub frame: Frame,
    /// Write the frame should have caused.
    pub expected: Option<RegisterWrite>,
    /// Write that was observed.
    pub actual: Option<RegisterWrite>,
    /// Register bank afterwards.
    pub registers: RegisterBank,
}

/// Summary of a sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// Frames sent.
    pub frames: usize,
    /// Frames to mapped addresses.
    pub writes_checked: usize,
    /// Frames to unmapped addresses.
    pub noops_checked: usize,
    /// Frames that misbehaved.
    pub mismatches: Vec<SweepMismatch>,
}

impl SweepReport {
    /// Returns true if every frame behaved.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

impl std::fmt::Display for SweepReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} frames: {} writes, {} no-ops, {} mismatches",
            self.frames,
            self.writes_checked,
            self.noops_checked,
            self.mismatches.len()
        )?;
        for m in &self.mismatches {
            let show = |w: Option<RegisterWrite>| w.map_or_else(|| "none".to_string(), |w| w.to_string());
            writeln!(
                f,
                "  {}: expected {}, got {}",
                m.frame,
                show(m.expected),
                show(m.actual)
            )?;
        }
        Ok(())
    }
}

/// Sweep parameters.
#[derive(Debug, Clone)]
pub struct Sweep {
    config: BenchConfig,
    addresses: RangeInclusive<u8>,
    data: RangeInclusive<u8>,
    parallel: bool,
}

impl Sweep {
    /// Sweep over every address and data value.
    #[must_use]
    pub fn new(config: BenchConfig) -> Self {
        Self {
            config: config.with_record_trace(false),
            addresses: 0..=MAX_ADDRESS,
            data: 0..=u8::MAX,
            parallel: false,
        }
    }

    /// Restricts the addresses swept. Values above 127 are clamped.
    #[must_use]
    pub fn with_addresses(mut self, addresses: RangeInclusive<u8>) -> Self {
        let (start, end) = addresses.into_inner();
        self.addresses = start.min(MAX_ADDRESS)..=end.min(MAX_ADDRESS);
        self
    }

    /// Restricts the data values swept.
    #[must_use]
    pub fn with_data(mut self, data: RangeInclusive<u8>) -> Self {
        self.data = data;
        self
    }

    /// Runs frames on a thread pool when the `parallel` feature is enabled.
    #[must_use]
    pub const fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Frames this sweep will send.
    #[must_use]
    pub fn frames(&self) -> Vec<Frame> {
        self.addresses
            .clone()
            .flat_map(|address| {
                self.data.clone().map(move |data| {
                    Frame::from_bits((u16::from(address) << 8) | u16::from(data)).with_flag(true)
                })
            })
            .collect()
    }

    /// Runs the sweep.
    ///
    /// # Errors
    ///
    /// Returns an error if the bench configuration is invalid.
    pub fn run(&self) -> Result<SweepReport, BenchError> {
        self.config.validate()?;
        let frames = self.frames();
        info!(
            "sweeping {} frames ({} ticks each)",
            frames.len(),
            self.config.transaction_ticks()
        );

        let results = self.check_all(&frames)?;

        let mut report = SweepReport {
            frames: frames.len(),
            ..SweepReport::default()
        };
        for (frame, mismatch) in frames.iter().zip(results) {
            if Register::from_address(frame.address()).is_some() {
                report.writes_checked += 1;
            } else {
                report.noops_checked += 1;
            }
            if let Some(mismatch) = mismatch {
                warn!("mismatch for {frame}");
                report.mismatches.push(mismatch);
            }
        }
        Ok(report)
    }

    #[cfg(feature = "parallel")]
    fn check_all(&self, frames: &[Frame]) -> Result<Vec<Option<SweepMismatch>>, BenchError> {
        if self.parallel {
            frames.par_iter().map(|frame| self.check(*frame)).collect()
        } else {
            frames.iter().map(|frame| self.check(*frame)).collect()
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn check_all(&self, frames: &[Frame]) -> Result<Vec<Option<SweepMismatch>>, BenchError> {
        if self.parallel {
            warn!("built without the `parallel` feature, sweeping serially");
        }
        frames.iter().map(|frame| self.check(*frame)).collect()
    }

    fn check(&self, frame: Frame) -> Result<Option<SweepMismatch>, BenchError> {
        let mut bench = Bench::new(self.config.clone())?;
        let outcome = bench.send(frame);

        let expected = RegisterBank::decode(frame);
        let expected_bank = RegisterBank::reset_value().commit(frame).0;
        let registers = *bench.registers();

        if outcome.write == expected && registers == expected_bank && bench.writes().len() <= 1 {
            Ok(None)
        } else {
            Ok(Some(SweepMismatch {
                frame,
                expected,
                actual: outcome.write,
                registers,
            }))
        }
    }
}
