//! JSON transaction scripts.
//!
//! ```json
//! {
//!   "name": "duty cycle",
//!   "steps": [
//!     { "op": "reset" },
//!     { "op": "write", "address": 4, "data": 128 },
//!     { "op": "expect", "register": "pwm_duty_cycle", "value": 128 }
//!   ]
//! }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use spireg_core::{Frame, PinSample, REGISTER_COUNT, Register, RegisterBank, RegisterWrite};
use tracing::info;

use crate::{Bench, BenchError};

/// One scripted action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    /// Assert reset for the configured time.
    Reset,
    /// Full transaction with the write flag set.
    Write {
        /// 7-bit register address.
        address: u16,
        /// 8-bit payload.
        data: u16,
    },
    /// Full transaction with the write flag clear.
    Read {
        /// 7-bit register address.
        address: u16,
        /// 8-bit payload.
        data: u16,
    },
    /// Transaction abandoned after `bits` bits. `bits` must be below 16.
    Abort {
        /// 7-bit register address.
        address: u16,
        /// 8-bit payload.
        data: u16,
        /// Bits sent before chip-select is released.
        bits: u8,
    },
    /// Idle bus.
    Idle {
        /// Ticks to wait.
        ticks: u32,
    },
    /// Arbitrary pin levels for a few ticks, then the settle time.
    Glitch {
        /// Pin levels to hold.
        pins: PinSample,
        /// Ticks to hold them for.
        ticks: u32,
    },
    /// Check one register.
    Expect {
        /// Register to check.
        register: Register,
        /// Expected value.
        value: u8,
    },
    /// Check every register, in address order.
    ExpectAll {
        /// Expected values.
        values: [u8; REGISTER_COUNT],
    },
}

/// A named list of steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// Optional display name.
    #[serde(default)]
    pub name: Option<String>,
    /// Steps, run in order.
    pub steps: Vec<Step>,
}

/// Result of running a script to completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptReport {
    /// Script name, if it had one.
    pub name: Option<String>,
    /// Steps executed.
    pub steps: usize,
    /// Expectations checked.
    pub checks: usize,
    /// Ticks the script took.
    pub ticks: u64,
    /// Writes committed while the script ran.
    pub writes: Vec<RegisterWrite>,
    /// Register bank at the end.
    pub registers: RegisterBank,
}

impl Script {
    /// Script from a list of steps.
    #[must_use]
    pub fn new(name: impl Into<String>, steps: Vec<Step>) -> Self {
        Self {
            name: Some(name.into()),
            steps,
        }
    }

    /// Parses a script from JSON text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid script.
    pub fn from_json(text: &str) -> Result<Self, BenchError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Loads a script from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, BenchError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Serializes the script as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, BenchError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Runs every step against `bench`, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns an error if a transaction cannot be encoded, an abort step
    /// would send the whole frame, or an expectation does not hold.
    pub fn run(&self, bench: &mut Bench) -> Result<ScriptReport, BenchError> {
        let start_ticks = bench.ticks();
        let start_writes = bench.writes().len();
        let mut checks = 0;

        info!(
            "running script '{}' ({} steps)",
            self.name.as_deref().unwrap_or("unnamed"),
            self.steps.len()
        );

        for (index, step) in self.steps.iter().enumerate() {
            match step {
                Step::Reset => bench.reset(),
                Step::Write { address, data } => {
                    bench.write(*address, *data)?;
                },
                Step::Read { address, data } => {
                    bench.read(*address, *data)?;
                },
                Step::Abort {
                    address,
                    data,
                    bits,
                } => {
                    let frame = Frame::new(*address, *data)?.with_flag(true);
                    bench.send_partial(frame, usize::from(*bits))?;
                },
                Step::Idle { ticks } => bench.idle(*ticks),
                Step::Glitch { pins, ticks } => bench.glitch(*pins, *ticks),
                Step::Expect { register, value } => {
                    checks += 1;
                    check(bench, index, *register, *value)?;
                },
                Step::ExpectAll { values } => {
                    checks += 1;
                    for (register, value) in Register::ALL.into_iter().zip(values) {
                        check(bench, index, register, *value)?;
                    }
                },
            }
        }

        Ok(ScriptReport {
            name: self.name.clone(),
            steps: self.steps.len(),
            checks,
            ticks: bench.ticks() - start_ticks,
            writes: bench.writes()[start_writes..]
                .iter()
                .map(|(_, write)| *write)
                .collect(),
            registers: *bench.registers(),
        })
    }
}

fn check(bench: &Bench, step: usize, register: Register, expected: u8) -> Result<(), BenchError> {
    let actual = bench.register(register);
    if actual == expected {
        Ok(())
    } else {
        Err(BenchError::expectation(step, register, expected, actual))
    }
}
