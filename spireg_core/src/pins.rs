//! Pin-level inputs sampled once per tick.

use serde::{Deserialize, Serialize};

/// One sample of the three external bus pins.
///
/// The pins are driven by an external controller with no phase relationship
/// to the system clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PinSample {
    /// Chip-select, active low.
    pub cs_n: bool,
    /// Controller-out, peripheral-in data line.
    pub copi: bool,
    /// Serial clock.
    pub sclk: bool,
}

impl PinSample {
    /// Bus parked between transactions: deselected, data and clock low.
    pub const IDLE: Self = Self {
        cs_n: true,
        copi: false,
        sclk: false,
    };

    /// Builds a sample from the three pin levels.
    #[must_use]
    pub const fn new(cs_n: bool, copi: bool, sclk: bool) -> Self {
        Self { cs_n, copi, sclk }
    }

    /// Returns true when the peripheral is selected.
    #[must_use]
    pub const fn selected(&self) -> bool {
        !self.cs_n
    }
}

impl Default for PinSample {
    fn default() -> Self {
        Self::IDLE
    }
}

impl std::fmt::Display for PinSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cs_n={} copi={} sclk={}",
            u8::from(self.cs_n),
            u8::from(self.copi),
            u8::from(self.sclk)
        )
    }
}

/// Everything the environment supplies for a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TickInputs {
    /// Bus pins for this tick.
    pub pins: PinSample,
    /// Synchronous reset, active low.
    pub rst_n: bool,
}

impl TickInputs {
    /// Reset asserted with the bus parked.
    #[must_use]
    pub const fn reset() -> Self {
        Self {
            pins: PinSample::IDLE,
            rst_n: false,
        }
    }

    /// Reset deasserted, bus driven with `pins`.
    #[must_use]
    pub const fn run(pins: PinSample) -> Self {
        Self { pins, rst_n: true }
    }

    /// Returns true if this tick forces the reset values.
    #[must_use]
    pub const fn in_reset(&self) -> bool {
        !self.rst_n
    }
}

impl From<PinSample> for TickInputs {
    fn from(pins: PinSample) -> Self {
        Self::run(pins)
    }
}
