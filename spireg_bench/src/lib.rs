//! Host-side test bench for the `spireg_core` peripheral.
//!
//! This crate plays the role of the external SPI controller: it turns frames
//! into per-tick pin waveforms with realistic timing, drives them into a
//! [`spireg_core::SpiPeripheral`], and checks what lands in the register
//! bank. It also loads JSON transaction scripts, runs built-in scenarios,
//! records tick traces, and sweeps the whole frame space.

mod bench;
mod config;
mod controller;
mod error;
mod scenarios;
mod script;
mod sweep;
mod trace;

pub use crate::bench::*;
pub use crate::config::*;
pub use crate::controller::*;
pub use crate::error::*;
pub use crate::scenarios::*;
pub use crate::script::*;
pub use crate::sweep::*;
pub use crate::trace::*;
