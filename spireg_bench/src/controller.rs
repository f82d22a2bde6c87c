//! SPI controller model: frames in, per-tick pin levels out.
//!
//! A transaction is chip-select low for one tick, then for each bit the data
//! line is set with the clock low for one half period and held while the
//! clock is high for one half period. After the last bit chip-select returns
//! high with clock and data low for the settle period.

use spireg_core::{FRAME_BITS, Frame, PinSample};

use crate::BenchConfig;

/// Per-tick pin levels for one or more transactions.
pub type Waveform = Vec<PinSample>;

/// Drives frames onto the bus with fixed timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiController {
    half_period: u32,
    settle_ticks: u32,
}

impl SpiController {
    /// Controller using the timing in `config`.
    #[must_use]
    pub const fn new(config: &BenchConfig) -> Self {
        Self {
            half_period: config.half_period,
            settle_ticks: config.settle_ticks,
        }
    }

    /// Waveform for a full transaction carrying `frame`.
    #[must_use]
    pub fn waveform(&self, frame: Frame) -> Waveform {
        self.partial_waveform(frame, usize::from(FRAME_BITS))
    }

    /// Waveform for a transaction that releases chip-select after `bits`
    /// bits of `frame`.
    #[must_use]
    pub fn partial_waveform(&self, frame: Frame, bits: usize) -> Waveform {
        let mut wave = Vec::with_capacity(self.capacity(bits));
        wave.push(PinSample::new(false, false, false));
        for bit in frame.bits_msb_first().take(bits) {
            self.clock_bit(&mut wave, bit);
        }
        self.release(&mut wave);
        wave
    }

    /// Waveform for `first_bits` bits of `first`, a one-tick chip-select
    /// release, then the whole of `second`.
    ///
    /// The release is shorter than the edge latency of the synchronizer on
    /// purpose: the peripheral still sees it as a close followed by a new
    /// open.
    #[must_use]
    pub fn restart_waveform(&self, first: Frame, first_bits: usize, second: Frame) -> Waveform {
        let mut wave = vec![PinSample::new(false, false, false)];
        for bit in first.bits_msb_first().take(first_bits) {
            self.clock_bit(&mut wave, bit);
        }
        wave.push(PinSample::IDLE);
        wave.extend(self.waveform(second));
        wave
    }

    fn clock_bit(&self, wave: &mut Waveform, bit: bool) {
        let half = self.half_period as usize;
        wave.extend(std::iter::repeat_n(PinSample::new(false, bit, false), half));
        wave.extend(std::iter::repeat_n(PinSample::new(false, bit, true), half));
    }

    fn release(&self, wave: &mut Waveform) {
        wave.extend(std::iter::repeat_n(PinSample::IDLE, self.settle_ticks as usize));
    }

    fn capacity(&self, bits: usize) -> usize {
        1 + bits * 2 * self.half_period as usize + self.settle_ticks as usize
    }
}
