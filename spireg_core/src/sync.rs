//! Input synchronizer.
//!
//! Each raw pin passes through a three-stage shift register clocked by the
//! system clock. Stage 0 captures the pin and may go metastable; it is never
//! used for a decision. Stage 1 is the current settled sample and stage 2 the
//! settled sample from the tick before, which together feed edge detection.

use contracts::*;
use serde::{Deserialize, Serialize};

use crate::PinSample;

/// Number of flip-flop stages per synchronized signal.
pub const SYNC_STAGES: usize = 3;

/// Ticks between a pin level first being sampled and the resulting edge
/// pulse.
pub const EDGE_LATENCY: u32 = SYNC_STAGES as u32 - 1;

/// Three-stage sample history for one signal. Index 0 is the newest stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SyncHistory {
    stages: [bool; SYNC_STAGES],
}

impl SyncHistory {
    /// History with every stage at `level`.
    #[must_use]
    pub const fn filled(level: bool) -> Self {
        Self {
            stages: [level; SYNC_STAGES],
        }
    }

    /// Shift `raw` into stage 0, moving every stage up by one.
    #[must_use]
    #[ensures(ret.stages[0] == raw)]
    #[ensures(ret.stages[1] == self.stages[0] && ret.stages[2] == self.stages[1])]
    pub fn shift(&self, raw: bool) -> Self {
        Self {
            stages: [raw, self.stages[0], self.stages[1]],
        }
    }

    /// Settled sample for this tick.
    #[must_use]
    pub const fn current(&self) -> bool {
        self.stages[1]
    }

    /// Settled sample from the previous tick.
    #[must_use]
    pub const fn previous(&self) -> bool {
        self.stages[2]
    }

    /// Rising transition between the previous and current samples.
    #[must_use]
    pub const fn rose(&self) -> bool {
        !self.previous() && self.current()
    }

    /// Falling transition between the previous and current samples.
    #[must_use]
    pub const fn fell(&self) -> bool {
        self.previous() && !self.current()
    }

    /// All stages, newest first.
    #[must_use]
    pub const fn stages(&self) -> [bool; SYNC_STAGES] {
        self.stages
    }
}

impl std::fmt::Display for SyncHistory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Printed oldest first, like a Verilog concatenation.
        for stage in self.stages.iter().rev() {
            write!(f, "{}", u8::from(*stage))?;
        }
        Ok(())
    }
}

/// Synchronizer state for all three bus pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputSynchronizer {
    /// Chip-select history.
    pub cs_n: SyncHistory,
    /// Data-line history.
    pub copi: SyncHistory,
    /// Serial-clock history.
    pub sclk: SyncHistory,
}

impl InputSynchronizer {
    /// Reset value: chip-select deselected (all ones), data and clock low.
    #[must_use]
    pub const fn reset_value() -> Self {
        Self {
            cs_n: SyncHistory::filled(true),
            copi: SyncHistory::filled(false),
            sclk: SyncHistory::filled(false),
        }
    }

    /// State after sampling `pins` at the end of this tick.
    #[must_use]
    pub fn next(&self, pins: PinSample) -> Self {
        Self {
            cs_n: self.cs_n.shift(pins.cs_n),
            copi: self.copi.shift(pins.copi),
            sclk: self.sclk.shift(pins.sclk),
        }
    }

    /// Settled data-line sample aligned with the current clock sample.
    #[must_use]
    pub const fn data_bit(&self) -> bool {
        self.copi.current()
    }
}

impl Default for InputSynchronizer {
    fn default() -> Self {
        Self::reset_value()
    }
}
