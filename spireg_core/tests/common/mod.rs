#![allow(dead_code)]

use std::sync::OnceLock;

use spireg_core::prelude::*;

/// Ticks each pin level is held for. Comfortably longer than the
/// synchronizer latency.
pub const HOLD: usize = 6;

pub fn init_test_logger() {
    static INIT: OnceLock<()> = OnceLock::new();
    let _ = INIT.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Records every effect the peripheral produces while it is driven.
pub struct Rig {
    pub dev: SpiPeripheral,
    pub writes: Vec<RegisterWrite>,
    pub events: Vec<TransactionEvent>,
}

impl Rig {
    pub fn new() -> Self {
        init_test_logger();
        let mut rig = Self {
            dev: SpiPeripheral::new(),
            writes: Vec::new(),
            events: Vec::new(),
        };
        rig.reset();
        rig
    }

    pub fn tick(&mut self, inputs: TickInputs) {
        let effects = self.dev.step(inputs);
        self.writes.extend(effects.write);
        self.events.extend(effects.event);
    }

    pub fn hold(&mut self, pins: PinSample, ticks: usize) {
        for _ in 0..ticks {
            self.tick(TickInputs::run(pins));
        }
    }

    pub fn reset(&mut self) {
        for _ in 0..5 {
            self.tick(TickInputs::reset());
        }
        self.hold(PinSample::IDLE, 5);
    }

    pub fn select(&mut self) {
        self.hold(PinSample::new(false, false, false), HOLD);
    }

    pub fn deselect(&mut self) {
        self.hold(PinSample::IDLE, HOLD);
    }

    pub fn clock_bits(&mut self, bits: impl IntoIterator<Item = bool>) {
        for bit in bits {
            self.hold(PinSample::new(false, bit, false), HOLD);
            self.hold(PinSample::new(false, bit, true), HOLD);
        }
        self.hold(PinSample::new(false, false, false), HOLD);
    }

    pub fn send(&mut self, frame: Frame) {
        self.select();
        self.clock_bits(frame.bits_msb_first());
        self.deselect();
    }

    pub fn write(&mut self, address: u16, data: u16) {
        self.send(Frame::new(address, data).unwrap().with_flag(true));
    }

    pub fn snapshot(&self) -> [u8; 5] {
        self.dev.registers().snapshot()
    }
}
