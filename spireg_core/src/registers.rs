//! Register bank driven by completed frames.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Frame, RegisterError};

/// Number of addressable registers.
pub const REGISTER_COUNT: usize = 5;

/// The five configuration registers, in address order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Register {
    /// Output enables for outputs 0..8. Address 0x00.
    EnableOutputsLow,
    /// Output enables for outputs 8..16. Address 0x01.
    EnableOutputsHigh,
    /// PWM enables for outputs 0..8. Address 0x02.
    EnablePwmLow,
    /// PWM enables for outputs 8..16. Address 0x03.
    EnablePwmHigh,
    /// Shared PWM duty cycle. Address 0x04.
    PwmDutyCycle,
}

impl Register {
    /// Every register, in address order.
    pub const ALL: [Self; REGISTER_COUNT] = [
        Self::EnableOutputsLow,
        Self::EnableOutputsHigh,
        Self::EnablePwmLow,
        Self::EnablePwmHigh,
        Self::PwmDutyCycle,
    ];

    /// Register at `address`, if any.
    #[must_use]
    pub const fn from_address(address: u8) -> Option<Self> {
        match address {
            0x00 => Some(Self::EnableOutputsLow),
            0x01 => Some(Self::EnableOutputsHigh),
            0x02 => Some(Self::EnablePwmLow),
            0x03 => Some(Self::EnablePwmHigh),
            0x04 => Some(Self::PwmDutyCycle),
            _ => None,
        }
    }

    /// Frame address of this register.
    #[must_use]
    pub const fn address(self) -> u8 {
        self as u8
    }

    /// Index into the bank.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// snake_case name, as used in scripts and reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::EnableOutputsLow => "enable_outputs_low",
            Self::EnableOutputsHigh => "enable_outputs_high",
            Self::EnablePwmLow => "enable_pwm_low",
            Self::EnablePwmHigh => "enable_pwm_high",
            Self::PwmDutyCycle => "pwm_duty_cycle",
        }
    }
}

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Register {
    type Err = RegisterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|reg| reg.name() == s)
            .ok_or_else(|| RegisterError::unknown_name(s))
    }
}

impl TryFrom<u8> for Register {
    type Error = RegisterError;

    fn try_from(address: u8) -> Result<Self, Self::Error> {
        Self::from_address(address).ok_or(RegisterError::UnmappedAddress(address))
    }
}

/// A single committed register write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegisterWrite {
    /// Target register.
    pub register: Register,
    /// Value written.
    pub value: u8,
}

impl std::fmt::Display for RegisterWrite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <- {:#04x}", self.register, self.value)
    }
}

/// The five output registers. All zero after reset.
///
/// These bytes are the interface to the PWM stage, which reads them
/// continuously; nothing in this crate reads them back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RegisterBank {
    values: [u8; REGISTER_COUNT],
}

impl RegisterBank {
    /// All registers zero.
    #[must_use]
    pub const fn reset_value() -> Self {
        Self {
            values: [0; REGISTER_COUNT],
        }
    }

    /// Bank holding `values`, in address order.
    #[must_use]
    pub const fn from_values(values: [u8; REGISTER_COUNT]) -> Self {
        Self { values }
    }

    /// Current value of `register`.
    #[must_use]
    pub const fn get(&self, register: Register) -> u8 {
        self.values[register.index()]
    }

    /// All values in address order.
    #[must_use]
    pub const fn snapshot(&self) -> [u8; REGISTER_COUNT] {
        self.values
    }

    /// Registers paired with their values, in address order.
    pub fn iter(&self) -> impl Iterator<Item = (Register, u8)> + '_ {
        Register::ALL.into_iter().map(|reg| (reg, self.get(reg)))
    }

    /// Decode a completed frame into a write, if its address is mapped.
    #[must_use]
    pub const fn decode(frame: Frame) -> Option<RegisterWrite> {
        match Register::from_address(frame.address()) {
            Some(register) => Some(RegisterWrite {
                register,
                value: frame.data(),
            }),
            None => None,
        }
    }

    /// Bank after committing `frame`, plus the write it caused.
    ///
    /// Frames addressed outside `0..=4` leave the bank unchanged.
    #[must_use]
    pub fn commit(&self, frame: Frame) -> (Self, Option<RegisterWrite>) {
        let Some(write) = Self::decode(frame) else {
            return (*self, None);
        };
        let mut values = self.values;
        values[write.register.index()] = write.value;
        (Self { values }, Some(write))
    }
}

impl Serialize for RegisterBank {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(REGISTER_COUNT))?;
        for (reg, value) in self.iter() {
            map.serialize_entry(reg.name(), &value)?;
        }
        map.end()
    }
}

impl std::fmt::Display for RegisterBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (reg, value) in self.iter() {
            writeln!(f, "{:#04x} {:<20} {:#04x}", reg.address(), reg.name(), value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0x00, Register::EnableOutputsLow)]
    #[case(0x01, Register::EnableOutputsHigh)]
    #[case(0x02, Register::EnablePwmLow)]
    #[case(0x03, Register::EnablePwmHigh)]
    #[case(0x04, Register::PwmDutyCycle)]
    fn test_address_map(#[case] address: u8, #[case] register: Register) {
        assert_eq!(Register::from_address(address), Some(register));
        assert_eq!(register.address(), address);
    }

    #[rstest]
    #[case(0x05)]
    #[case(0x30)]
    #[case(0x41)]
    #[case(0x7f)]
    fn test_unmapped_addresses(#[case] address: u8) {
        assert_eq!(Register::from_address(address), None);
        assert_eq!(
            Register::try_from(address),
            Err(RegisterError::UnmappedAddress(address))
        );
    }

    #[test]
    fn test_names_round_trip() {
        for reg in Register::ALL {
            assert_eq!(reg.name().parse::<Register>(), Ok(reg));
        }
        assert!("pwm_duty".parse::<Register>().is_err());
    }

    #[test]
    fn test_commit_writes_one_register() {
        let bank = RegisterBank::reset_value();
        let (bank, write) = bank.commit(Frame::new(0x02, 0xFF).unwrap());
        assert_eq!(
            write,
            Some(RegisterWrite {
                register: Register::EnablePwmLow,
                value: 0xFF
            })
        );
        assert_eq!(bank.snapshot(), [0, 0, 0xFF, 0, 0]);
    }

    #[test]
    fn test_commit_ignores_unmapped_address() {
        let bank = RegisterBank::from_values([1, 2, 3, 4, 5]);
        let (after, write) = bank.commit(Frame::new(0x30, 0xAA).unwrap());
        assert_eq!(write, None);
        assert_eq!(after, bank);
    }

    #[test]
    fn test_flag_bit_is_ignored() {
        let frame = Frame::new(0x00, 0xF0).unwrap();
        let bank = RegisterBank::reset_value();
        assert_eq!(bank.commit(frame).0, bank.commit(frame.with_flag(true)).0);
    }
}
