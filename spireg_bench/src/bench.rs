//! Bench harness: one peripheral, one controller, and a record of writes.

use spireg_core::{
    FRAME_BITS, Frame, PinSample, Register, RegisterBank, RegisterWrite, SpiPeripheral, TickInputs,
};
use tracing::{debug, info};

use crate::{BenchConfig, BenchError, SpiController, Trace, TraceRow};

/// What one driven transaction did to the register bank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionOutcome {
    /// The frame that was driven.
    pub frame: Frame,
    /// The write it committed, if any.
    pub write: Option<RegisterWrite>,
    /// Ticks the transaction took, settle time included.
    pub ticks: u64,
}

/// Drives a [`SpiPeripheral`] the way an external controller would.
#[derive(Debug, Clone)]
pub struct Bench {
    dev: SpiPeripheral,
    config: BenchConfig,
    controller: SpiController,
    writes: Vec<(u64, RegisterWrite)>,
    trace: Option<Trace>,
}

impl Bench {
    /// A bench with a freshly reset peripheral.
    ///
    /// # Errors
    ///
    /// Returns an error if `config` does not validate.
    pub fn new(config: BenchConfig) -> Result<Self, BenchError> {
        config.validate()?;
        let mut bench = Self {
            dev: SpiPeripheral::new(),
            controller: SpiController::new(&config),
            trace: config.record_trace.then(Trace::new),
            writes: Vec::new(),
            config,
        };
        bench.reset();
        Ok(bench)
    }

    /// Bench configuration.
    #[must_use]
    pub const fn config(&self) -> &BenchConfig {
        &self.config
    }

    /// The peripheral under test.
    #[must_use]
    pub const fn peripheral(&self) -> &SpiPeripheral {
        &self.dev
    }

    /// Output registers.
    #[must_use]
    pub const fn registers(&self) -> &RegisterBank {
        self.dev.registers()
    }

    /// Current value of `register`.
    #[must_use]
    pub const fn register(&self, register: Register) -> u8 {
        self.dev.registers().get(register)
    }

    /// Every committed write with the tick it landed on.
    #[must_use]
    pub fn writes(&self) -> &[(u64, RegisterWrite)] {
        &self.writes
    }

    /// Ticks evaluated so far.
    #[must_use]
    pub const fn ticks(&self) -> u64 {
        self.dev.ticks()
    }

    /// Recorded trace, if tracing is enabled.
    #[must_use]
    pub const fn trace(&self) -> Option<&Trace> {
        self.trace.as_ref()
    }

    /// Advance one tick.
    pub fn tick(&mut self, inputs: TickInputs) {
        let tick = self.dev.ticks();
        let effects = self.dev.step(inputs);
        if let Some(write) = effects.write {
            self.writes.push((tick, write));
        }
        if let Some(trace) = self.trace.as_mut() {
            trace.push(TraceRow::new(tick, inputs, &effects, self.dev.state()));
        }
    }

    /// Drive `pins` for one tick each, reset deasserted.
    pub fn drive<I: IntoIterator<Item = PinSample>>(&mut self, pins: I) {
        for sample in pins {
            self.tick(TickInputs::run(sample));
        }
    }

    /// Hold the bus idle for `ticks` ticks.
    pub fn idle(&mut self, ticks: u32) {
        self.drive(std::iter::repeat_n(PinSample::IDLE, ticks as usize));
    }

    /// Hold `pins` for `ticks` ticks, then settle with the bus idle.
    pub fn glitch(&mut self, pins: PinSample, ticks: u32) {
        self.drive(std::iter::repeat_n(pins, ticks as usize));
        self.idle(self.config.settle_ticks);
    }

    /// Assert reset, then idle, each for the configured reset time.
    pub fn reset(&mut self) {
        for _ in 0..self.config.reset_ticks {
            self.tick(TickInputs::reset());
        }
        self.idle(self.config.reset_ticks);
        debug!("reset at tick {}", self.ticks());
    }

    /// Drive one complete transaction carrying `frame`.
    pub fn send(&mut self, frame: Frame) -> TransactionOutcome {
        let wave = self.controller.waveform(frame);
        self.run_transaction(frame, wave)
    }

    /// Drive the first `bits` bits of `frame`, then release chip-select.
    ///
    /// # Errors
    ///
    /// Returns an error if `bits` would complete the frame.
    pub fn send_partial(
        &mut self,
        frame: Frame,
        bits: usize,
    ) -> Result<TransactionOutcome, BenchError> {
        check_partial(bits)?;
        let wave = self.controller.partial_waveform(frame, bits);
        Ok(self.run_transaction(frame, wave))
    }

    /// Drive `first_bits` bits of `first`, release chip-select for one tick,
    /// then send all of `second`.
    ///
    /// # Errors
    ///
    /// Returns an error if `first_bits` would complete the first frame.
    pub fn send_restarted(
        &mut self,
        first: Frame,
        first_bits: usize,
        second: Frame,
    ) -> Result<TransactionOutcome, BenchError> {
        check_partial(first_bits)?;
        let wave = self.controller.restart_waveform(first, first_bits, second);
        Ok(self.run_transaction(second, wave))
    }

    /// Write `data` to `address` with the write flag set.
    ///
    /// # Errors
    ///
    /// Returns an error if the address or data does not fit the frame.
    pub fn write(&mut self, address: u16, data: u16) -> Result<TransactionOutcome, BenchError> {
        let frame = Frame::new(address, data)?.with_flag(true);
        info!("write {frame}");
        Ok(self.send(frame))
    }

    /// Send a frame with the write flag clear.
    ///
    /// The peripheral has no read path, so this decodes like any other frame.
    ///
    /// # Errors
    ///
    /// Returns an error if the address or data does not fit the frame.
    pub fn read(&mut self, address: u16, data: u16) -> Result<TransactionOutcome, BenchError> {
        let frame = Frame::new(address, data)?;
        info!("read {frame}");
        Ok(self.send(frame))
    }

    fn run_transaction(&mut self, frame: Frame, wave: Vec<PinSample>) -> TransactionOutcome {
        let start = self.ticks();
        let first_write = self.writes.len();
        self.drive(wave);
        let write = self.writes[first_write..].last().map(|(_, w)| *w);
        TransactionOutcome {
            frame,
            write,
            ticks: self.ticks() - start,
        }
    }
}

fn check_partial(bits: usize) -> Result<(), BenchError> {
    if bits >= usize::from(FRAME_BITS) {
        return Err(BenchError::PartialFrameTooLong(bits));
    }
    Ok(())
}
