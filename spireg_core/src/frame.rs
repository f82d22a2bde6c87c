//! 16-bit serial frame format.
//!
//! ```text
//!  15   14        8 7         0
//! +----+-----------+-----------+
//! |flag|  address  |   data    |
//! +----+-----------+-----------+
//! ```
//!
//! Frames are transmitted MSB first. The flag bit is the controller's
//! read/write marker; the decoder ignores it.

use contracts::*;
use serde::{Deserialize, Serialize};

use crate::FrameError;

/// Number of bits in one frame.
pub const FRAME_BITS: u8 = 16;

/// Largest value of the 7-bit address field.
pub const MAX_ADDRESS: u8 = 0x7f;

const FLAG_BIT: u16 = 1 << 15;
const ADDRESS_SHIFT: u16 = 8;

/// One complete serial frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Frame(u16);

impl Frame {
    /// Builds a frame with the flag bit clear.
    ///
    /// # Errors
    ///
    /// Returns an error if `address` exceeds 7 bits or `data` exceeds 8 bits.
    #[ensures(ret.as_ref().map(|f| u16::from(f.address()) == address && u16::from(f.data()) == data).unwrap_or(true))]
    pub fn new(address: u16, data: u16) -> Result<Self, FrameError> {
        if address > u16::from(MAX_ADDRESS) {
            return Err(FrameError::AddressOutOfRange(address));
        }
        if data > u16::from(u8::MAX) {
            return Err(FrameError::DataOutOfRange(data));
        }
        Ok(Self((address << ADDRESS_SHIFT) | data))
    }

    /// Wraps a raw 16-bit word.
    #[must_use]
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Returns the frame with bit 15 set to `flag`.
    #[must_use]
    pub const fn with_flag(self, flag: bool) -> Self {
        if flag {
            Self(self.0 | FLAG_BIT)
        } else {
            Self(self.0 & !FLAG_BIT)
        }
    }

    /// Raw 16-bit word.
    #[must_use]
    pub const fn bits(&self) -> u16 {
        self.0
    }

    /// Bit 15.
    #[must_use]
    pub const fn flag(&self) -> bool {
        self.0 & FLAG_BIT != 0
    }

    /// Bits 14..8.
    #[must_use]
    pub const fn address(&self) -> u8 {
        ((self.0 >> ADDRESS_SHIFT) as u8) & MAX_ADDRESS
    }

    /// Bits 7..0.
    #[must_use]
    pub const fn data(&self) -> u8 {
        (self.0 & 0xff) as u8
    }

    /// The frame's bits in transmission order, most significant first.
    pub fn bits_msb_first(&self) -> impl Iterator<Item = bool> + use<> {
        let word = self.0;
        (0..u16::from(FRAME_BITS))
            .rev()
            .map(move |i| (word >> i) & 1 == 1)
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {:#04x} <- {:#04x}",
            if self.flag() { "w" } else { "-" },
            self.address(),
            self.data()
        )
    }
}

impl From<Frame> for u16 {
    fn from(frame: Frame) -> Self {
        frame.0
    }
}


#[cfg(test)]
mod property_tests {
    use super::*;
    use quickcheck::quickcheck;

    quickcheck! {
        fn prop_fields_survive_construction(address: u8, data: u8) -> bool {
            let address = address & MAX_ADDRESS;
            let frame = Frame::new(u16::from(address), u16::from(data)).unwrap();
            frame.address() == address && frame.data() == data && !frame.flag()
        }

        fn prop_msb_first_rebuilds_word(bits: u16) -> bool {
            let rebuilt = Frame::from_bits(bits)
                .bits_msb_first()
                .fold(0u16, |acc, bit| (acc << 1) | u16::from(bit));
            rebuilt == bits
        }
    }
}
