//! Cycle-level model of a serial register-write peripheral.
//!
//! The peripheral samples three asynchronous pins (active-low chip-select,
//! data, serial clock) once per system clock tick, reassembles 16-bit
//! MSB-first frames from them, and commits the payload of each complete
//! frame into one of five 8-bit configuration registers.
//!
//! The pipeline is evaluated as a pure function of the previous state and
//! the current pins:
//!
//! ```text
//! pins -> InputSynchronizer -> Edges -> TransactionState -> RegisterBank
//! ```
//!
//! See [`PeripheralState::tick`] for the composed step and
//! [`SpiPeripheral`] for a stateful wrapper.

mod edges;
mod error;
mod frame;
mod peripheral;
mod pins;
mod registers;
mod sync;
mod transaction;

pub use crate::edges::*;
pub use crate::error::*;
pub use crate::frame::*;
pub use crate::peripheral::*;
pub use crate::pins::*;
pub use crate::registers::*;
pub use crate::sync::*;
pub use crate::transaction::*;

/// Commonly used types for driving the peripheral.
pub mod prelude {
    pub use crate::{
        Edges, Frame, PeripheralState, PinSample, Register, RegisterBank, RegisterWrite,
        SpiPeripheral, TickEffects, TickInputs, TransactionEvent, TransactionState,
    };
}
