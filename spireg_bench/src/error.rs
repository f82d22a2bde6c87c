//! Error types for the bench.

use spireg_core::{FrameError, Register};
use thiserror::Error;

/// Errors produced while configuring or running the bench.
#[derive(Debug, Error)]
pub enum BenchError {
    /// The bench configuration cannot drive a valid waveform.
    #[error("Invalid bench configuration: {0}")]
    InvalidConfig(String),

    /// A transaction could not be encoded as a frame.
    #[error("Invalid transaction: {0}")]
    Frame(#[from] FrameError),

    /// A register held an unexpected value.
    #[error("Step {step}: expected {register} = {expected:#04x}, got {actual:#04x}")]
    Expectation {
        /// Index of the failing script step.
        step: usize,
        /// Register that was checked.
        register: Register,
        /// Value the script expected.
        expected: u8,
        /// Value the register held.
        actual: u8,
    },

    /// A partial transaction was asked to carry a whole frame.
    #[error("Partial transaction must stop before all 16 bits, got {0} bits")]
    PartialFrameTooLong(usize),

    /// No built-in scenario has this name.
    #[error("Unknown scenario '{0}'")]
    UnknownScenario(String),

    /// Reading a script or writing a trace failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A script was not valid JSON.
    #[error("Script parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Writing a trace as CSV failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl BenchError {
    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an unknown scenario error.
    pub fn unknown_scenario(name: impl Into<String>) -> Self {
        Self::UnknownScenario(name.into())
    }

    /// Create a failed expectation error.
    #[must_use]
    pub const fn expectation(step: usize, register: Register, expected: u8, actual: u8) -> Self {
        Self::Expectation {
            step,
            register,
            expected,
            actual,
        }
    }
}
