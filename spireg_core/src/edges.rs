//! Combinational edge detection over the synchronized pins.

use serde::Serialize;

use crate::InputSynchronizer;

/// Single-tick edge pulses. Recomputed every tick and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Edges {
    /// Chip-select went from deselected to selected.
    pub cs_fell: bool,
    /// Chip-select went from selected to deselected.
    pub cs_rose: bool,
    /// Serial clock rising edge.
    pub sclk_rose: bool,
}

impl Edges {
    /// No edges this tick.
    pub const NONE: Self = Self {
        cs_fell: false,
        cs_rose: false,
        sclk_rose: false,
    };

    /// Edges visible in the current synchronizer state.
    #[must_use]
    pub const fn detect(sync: &InputSynchronizer) -> Self {
        Self {
            cs_fell: sync.cs_n.fell(),
            cs_rose: sync.cs_n.rose(),
            sclk_rose: sync.sclk.rose(),
        }
    }

    /// Returns true if any pulse is asserted.
    #[must_use]
    pub const fn any(&self) -> bool {
        self.cs_fell || self.cs_rose || self.sclk_rose
    }
}

impl std::fmt::Display for Edges {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names = [
            (self.cs_fell, "cs_fell"),
            (self.cs_rose, "cs_rose"),
            (self.sclk_rose, "sclk_rose"),
        ];
        let mut first = true;
        for (_, name) in names.iter().filter(|(set, _)| *set) {
            if !first {
                write!(f, "|")?;
            }
            write!(f, "{name}")?;
            first = false;
        }
        if first {
            write!(f, "-")?;
        }
        Ok(())
    }
}
