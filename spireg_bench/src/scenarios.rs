//! Built-in scenarios.
//!
//! `tiny_tapeout_spi` replays the register-write sequence the peripheral was
//! originally validated with; the others cover the anomalies the decoder
//! must shrug off.

use spireg_core::{PinSample, Register};

use crate::{Bench, BenchError, Script, ScriptReport, Step};

/// A named script with a short description.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Lookup name.
    pub name: &'static str,
    /// One-line description.
    pub description: &'static str,
    /// Steps to run.
    pub script: Script,
}

impl Scenario {
    fn new(name: &'static str, description: &'static str, steps: Vec<Step>) -> Self {
        Self {
            name,
            description,
            script: Script::new(name, steps),
        }
    }

    /// Runs the scenario on `bench`.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails.
    pub fn run(&self, bench: &mut Bench) -> Result<ScriptReport, BenchError> {
        self.script.run(bench)
    }
}

const fn write(address: u16, data: u16) -> Step {
    Step::Write { address, data }
}

const fn read(address: u16, data: u16) -> Step {
    Step::Read { address, data }
}

const fn expect(register: Register, value: u8) -> Step {
    Step::Expect { register, value }
}

const fn idle(ticks: u32) -> Step {
    Step::Idle { ticks }
}

lazy_static::lazy_static! {
    static ref TINY_TAPEOUT_SPI: Scenario = Scenario::new(
        "tiny_tapeout_spi",
        "reference write sequence, including unmapped and flag-clear frames",
        vec![
            Step::Reset,
            write(0x00, 0xF0),
            expect(Register::EnableOutputsLow, 0xF0),
            idle(1000),
            write(0x01, 0xCC),
            expect(Register::EnableOutputsHigh, 0xCC),
            idle(100),
            write(0x30, 0xAA),
            idle(100),
            read(0x30, 0xBE),
            expect(Register::EnableOutputsLow, 0xF0),
            idle(100),
            read(0x41, 0xEF),
            idle(100),
            write(0x02, 0xFF),
            idle(100),
            write(0x04, 0xCF),
            expect(Register::PwmDutyCycle, 0xCF),
            write(0x04, 0xFF),
            expect(Register::PwmDutyCycle, 0xFF),
            write(0x04, 0x00),
            expect(Register::PwmDutyCycle, 0x00),
            write(0x04, 0x01),
            Step::ExpectAll { values: [0xF0, 0xCC, 0xFF, 0x00, 0x01] },
        ],
    );

    static ref PWM_CHANNEL_SETUP: Scenario = Scenario::new(
        "pwm_channel_setup",
        "configure duty cycle, output enable and PWM enable for both output banks",
        vec![
            Step::Reset,
            write(0x04, 0x80),
            write(0x00, 0x01),
            expect(Register::EnableOutputsLow, 0x01),
            write(0x02, 0x01),
            Step::ExpectAll { values: [0x01, 0x00, 0x01, 0x00, 0x80] },
            write(0x00, 0x00),
            write(0x02, 0x00),
            write(0x04, 0xC0),
            write(0x01, 0x04),
            expect(Register::EnableOutputsHigh, 0x04),
            write(0x03, 0x04),
            Step::ExpectAll { values: [0x00, 0x04, 0x00, 0x04, 0xC0] },
        ],
    );

    static ref TRUNCATED_FRAMES: Scenario = Scenario::new(
        "truncated_frames",
        "frames cut short at every length leave the bank untouched",
        {
            let mut steps = vec![Step::Reset, write(0x00, 0x5A)];
            steps.extend((0..16).map(|bits| Step::Abort { address: 0x00, data: 0xA5, bits }));
            steps.push(Step::ExpectAll { values: [0x5A, 0, 0, 0, 0] });
            steps
        },
    );

    static ref GLITCHES: Scenario = Scenario::new(
        "glitches",
        "single-tick pulses on each pin while idle",
        vec![
            Step::Reset,
            write(0x03, 0x3C),
            Step::Glitch { pins: PinSample::new(false, false, false), ticks: 1 },
            Step::Glitch { pins: PinSample::new(true, true, false), ticks: 1 },
            Step::Glitch { pins: PinSample::new(true, false, true), ticks: 1 },
            Step::Glitch { pins: PinSample::new(false, true, true), ticks: 1 },
            Step::ExpectAll { values: [0, 0, 0, 0x3C, 0] },
        ],
    );

    static ref RESET_CLEARS: Scenario = Scenario::new(
        "reset_clears",
        "reset returns every register to zero",
        vec![
            Step::Reset,
            write(0x00, 0x11),
            write(0x01, 0x22),
            write(0x02, 0x33),
            write(0x03, 0x44),
            write(0x04, 0x55),
            Step::ExpectAll { values: [0x11, 0x22, 0x33, 0x44, 0x55] },
            Step::Reset,
            Step::ExpectAll { values: [0; 5] },
        ],
    );

    /// Every built-in scenario.
    pub static ref ALL_SCENARIOS: Vec<&'static Scenario> = vec![
        &*TINY_TAPEOUT_SPI,
        &*PWM_CHANNEL_SETUP,
        &*TRUNCATED_FRAMES,
        &*GLITCHES,
        &*RESET_CLEARS,
    ];
}

/// Looks up a built-in scenario by name.
///
/// # Errors
///
/// Returns an error if no scenario has that name.
pub fn scenario(name: &str) -> Result<&'static Scenario, BenchError> {
    ALL_SCENARIOS
        .iter()
        .copied()
        .find(|s| s.name == name)
        .ok_or_else(|| BenchError::unknown_scenario(name))
}
