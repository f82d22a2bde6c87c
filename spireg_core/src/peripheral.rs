//! The composed peripheral: one pure step per system clock tick.

use serde::Serialize;
use tracing::{debug, trace};

use crate::{
    Edges, InputSynchronizer, RegisterBank, RegisterWrite, TickInputs, TransactionEvent,
    TransactionState,
};

/// Complete peripheral state between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct PeripheralState {
    /// Pin synchronizers.
    pub sync: InputSynchronizer,
    /// Transaction assembler.
    pub transaction: TransactionState,
    /// Output registers.
    pub registers: RegisterBank,
}

/// Observable side effects of a single tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct TickEffects {
    /// Edge pulses seen this tick.
    pub edges: Edges,
    /// Assembler transition, if notable.
    pub event: Option<TransactionEvent>,
    /// Register write committed this tick.
    pub write: Option<RegisterWrite>,
}

impl PeripheralState {
    /// State forced by reset.
    #[must_use]
    pub const fn reset_value() -> Self {
        Self {
            sync: InputSynchronizer::reset_value(),
            transaction: TransactionState::Idle,
            registers: RegisterBank::reset_value(),
        }
    }

    /// Advance one tick.
    ///
    /// Every stage reads this tick's snapshot, so the order in which the
    /// next values are computed does not matter: the edges come from the
    /// current synchronizer, the assembler and register bank step from their
    /// current values, and the synchronizer samples the pins last.
    #[must_use]
    pub fn tick(&self, inputs: TickInputs) -> (Self, TickEffects) {
        if inputs.in_reset() {
            return (Self::reset_value(), TickEffects::default());
        }

        let edges = Edges::detect(&self.sync);
        let (transaction, event) = self.transaction.next(edges, self.sync.data_bit());

        let (registers, write) = match self.transaction {
            TransactionState::Closed { frame } => self.registers.commit(frame),
            _ => (self.registers, None),
        };

        let next = Self {
            sync: self.sync.next(inputs.pins),
            transaction,
            registers,
        };
        let effects = TickEffects {
            edges,
            event,
            write,
        };
        log_effects(&self.transaction, &effects);
        (next, effects)
    }
}

fn log_effects(before: &TransactionState, effects: &TickEffects) {
    if effects.edges.any() {
        trace!("edges: {}", effects.edges);
    }
    match effects.event {
        Some(TransactionEvent::BitShifted { bit, bits }) => {
            trace!("shifted bit {} ({bits} received)", u8::from(bit));
        },
        Some(TransactionEvent::Completed(frame)) => debug!("frame complete: {frame}"),
        Some(TransactionEvent::Truncated { bits }) => {
            debug!("chip-select released after {bits} bits, frame dropped");
        },
        Some(TransactionEvent::Restarted { bits }) => {
            debug!("transaction restarted, {bits} bits dropped");
        },
        Some(TransactionEvent::IgnoredClock) => trace!("clock edge after complete frame ignored"),
        Some(TransactionEvent::Opened) | Some(TransactionEvent::Closed(_)) | None => {},
    }
    match (effects.write, before.latched_frame()) {
        (Some(write), _) => debug!("register write: {write}"),
        (None, Some(frame)) if before.commit_pending() => {
            debug!("address {:#04x} unmapped, write discarded", frame.address());
        },
        _ => {},
    }
}

/// Stateful wrapper around [`PeripheralState`] that counts ticks.
#[derive(Debug, Clone, Default)]
pub struct SpiPeripheral {
    state: PeripheralState,
    ticks: u64,
}

impl SpiPeripheral {
    /// A peripheral in its reset state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance one tick and return what happened.
    pub fn step(&mut self, inputs: impl Into<TickInputs>) -> TickEffects {
        let (next, effects) = self.state.tick(inputs.into());
        self.state = next;
        self.ticks += 1;
        effects
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &PeripheralState {
        &self.state
    }

    /// Output registers.
    #[must_use]
    pub const fn registers(&self) -> &RegisterBank {
        &self.state.registers
    }

    /// Assembler state.
    #[must_use]
    pub const fn transaction(&self) -> &TransactionState {
        &self.state.transaction
    }

    /// Ticks evaluated since construction.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.ticks
    }
}
