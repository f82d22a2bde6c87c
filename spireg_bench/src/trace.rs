//! Per-tick traces and CSV export.

use std::io::Write;
use std::path::Path;

use serde::Serialize;
use spireg_core::{PeripheralState, TickEffects, TickInputs};

use crate::BenchError;

/// One traced tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceRow {
    /// Tick index since the bench was created.
    pub tick: u64,
    /// Reset input.
    pub rst_n: u8,
    /// Chip-select pin.
    pub cs_n: u8,
    /// Data pin.
    pub copi: u8,
    /// Clock pin.
    pub sclk: u8,
    /// Edge pulses seen this tick.
    pub edges: String,
    /// Assembler state after the tick.
    pub state: String,
    /// Assembler event, if any.
    pub event: Option<String>,
    /// Register write committed this tick, if any.
    pub write: Option<String>,
}

impl TraceRow {
    /// Row for a tick that consumed `inputs`, produced `effects`, and left
    /// the peripheral in `after`.
    #[must_use]
    pub fn new(tick: u64, inputs: TickInputs, effects: &TickEffects, after: &PeripheralState) -> Self {
        Self {
            tick,
            rst_n: u8::from(inputs.rst_n),
            cs_n: u8::from(inputs.pins.cs_n),
            copi: u8::from(inputs.pins.copi),
            sclk: u8::from(inputs.pins.sclk),
            edges: effects.edges.to_string(),
            state: after.transaction.to_string(),
            event: effects.event.map(|e| e.to_string()),
            write: effects.write.map(|w| w.to_string()),
        }
    }
}

/// A recorded sequence of ticks.
#[derive(Debug, Clone, Default)]
pub struct Trace {
    rows: Vec<TraceRow>,
}

impl Trace {
    /// Empty trace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a row.
    pub fn push(&mut self, row: TraceRow) {
        self.rows.push(row);
    }

    /// Recorded rows, oldest first.
    #[must_use]
    pub fn rows(&self) -> &[TraceRow] {
        &self.rows
    }

    /// Number of recorded ticks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows on which something other than a steady state happened.
    pub fn eventful(&self) -> impl Iterator<Item = &TraceRow> {
        self.rows
            .iter()
            .filter(|row| row.event.is_some() || row.write.is_some())
    }

    /// Writes the trace as CSV with a header row.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the underlying writer fails.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), BenchError> {
        let mut csv = csv::Writer::from_writer(writer);
        for row in &self.rows {
            csv.serialize(row)?;
        }
        csv.flush()?;
        Ok(())
    }

    /// Writes the trace as CSV to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn save_csv(&self, path: impl AsRef<Path>) -> Result<(), BenchError> {
        let file = std::fs::File::create(path)?;
        self.write_csv(std::io::BufWriter::new(file))
    }
}
