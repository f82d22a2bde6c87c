//! Error types for the fallible constructors.
//!
//! The tick path never fails; anomalies on the bus degrade to "no effect".

use thiserror::Error;

/// Errors produced when building a [`Frame`](crate::Frame).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// The address does not fit in the 7-bit address field.
    #[error("Address must be 7-bit (0-127), got {0}")]
    AddressOutOfRange(u16),

    /// The data does not fit in the 8-bit data field.
    #[error("Data must be 8-bit (0-255), got {0}")]
    DataOutOfRange(u16),
}

/// Errors produced when naming or addressing a [`Register`](crate::Register).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    /// No register has this name.
    #[error("Unknown register '{0}'")]
    UnknownName(String),

    /// No register lives at this address.
    #[error("No register at address {0:#04x}")]
    UnmappedAddress(u8),
}

impl RegisterError {
    /// Create an unknown-name error.
    pub fn unknown_name(name: impl Into<String>) -> Self {
        Self::UnknownName(name.into())
    }
}
