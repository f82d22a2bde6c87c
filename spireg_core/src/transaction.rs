//! Transaction assembler.
//!
//! A transaction opens on a chip-select falling edge, shifts one data bit per
//! serial-clock rising edge into a 16-bit shift register, and closes on the
//! chip-select rising edge. A frame is only handed to the register bank if
//! all 16 bits arrived before chip-select was released.
//!
//! ```text
//!            cs_fell                 16th sclk_rose             cs_rose
//!   Idle ------------> Open{..} --------------------> Complete ---------> Closed
//!    ^                  |  ^  \__ sclk_rose: shift      |                   |
//!    |     cs_rose      |  |                            | sclk_rose: ignored |
//!    +------------------+  +--- cs_fell (restart) ------+                   |
//!    +------------------------------ next tick -----------------------------+
//! ```
//!
//! `Closed` lasts exactly one tick: it is the commit window the register bank
//! acts on, after which the frame is gone.

use contracts::*;
use serde::Serialize;

use crate::{Edges, FRAME_BITS, Frame};

/// Assembler state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum TransactionState {
    /// Chip-select released, nothing pending.
    #[default]
    Idle,
    /// Chip-select asserted, fewer than 16 bits received.
    Open {
        /// Bits received so far, newest in bit 0.
        shift: u16,
        /// Number of bits received, `0..16`.
        bits: u8,
    },
    /// Chip-select asserted, all 16 bits received. Further clocks are ignored.
    Complete {
        /// The received frame.
        frame: Frame,
    },
    /// Chip-select released after a complete frame; the commit tick.
    Closed {
        /// The frame to commit.
        frame: Frame,
    },
}

/// Notable transitions, reported alongside the next state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TransactionEvent {
    /// A new transaction started from `Idle` or `Closed`.
    Opened,
    /// Chip-select fell again before the previous transaction closed.
    Restarted {
        /// Bits of the abandoned transaction.
        bits: u8,
    },
    /// One data bit was shifted in.
    BitShifted {
        /// The bit value.
        bit: bool,
        /// Bits received including this one.
        bits: u8,
    },
    /// The 16th bit arrived.
    Completed(Frame),
    /// Chip-select rose before all 16 bits arrived; the partial frame is dropped.
    Truncated {
        /// Bits received before the abort.
        bits: u8,
    },
    /// Chip-select rose after a complete frame.
    Closed(Frame),
    /// A clock edge arrived after the frame was already complete.
    IgnoredClock,
}

impl TransactionState {
    /// A freshly opened transaction.
    #[must_use]
    pub const fn opened() -> Self {
        Self::Open { shift: 0, bits: 0 }
    }

    /// Chip-select is asserted.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Open { .. } | Self::Complete { .. })
    }

    /// A full frame has been received and not yet consumed.
    #[must_use]
    pub const fn frame_received(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Closed { .. })
    }

    /// The register bank must commit this tick.
    #[must_use]
    pub const fn commit_pending(&self) -> bool {
        matches!(self, Self::Closed { .. })
    }

    /// Bits received in the active transaction.
    #[must_use]
    pub const fn bit_count(&self) -> u8 {
        match self {
            Self::Open { bits, .. } => *bits,
            Self::Complete { .. } => FRAME_BITS,
            Self::Idle | Self::Closed { .. } => 0,
        }
    }

    /// Contents of the shift register.
    #[must_use]
    pub const fn shift_register(&self) -> u16 {
        match self {
            Self::Idle => 0,
            Self::Open { shift, .. } => *shift,
            Self::Complete { frame } | Self::Closed { frame } => frame.bits(),
        }
    }

    /// The latched frame, valid once all 16 bits have arrived.
    #[must_use]
    pub const fn latched_frame(&self) -> Option<Frame> {
        match self {
            Self::Complete { frame } | Self::Closed { frame } => Some(*frame),
            Self::Idle | Self::Open { .. } => None,
        }
    }

    /// Next state given this tick's edges and settled data bit.
    ///
    /// Rules apply in priority order: a chip-select fall restarts
    /// unconditionally; otherwise a clock edge shifts while open; then a
    /// chip-select rise closes whatever is in flight.
    #[must_use]
    #[ensures(ret.0.bit_count() <= FRAME_BITS)]
    #[ensures(edges.cs_fell -> ret.0 == Self::opened())]
    pub fn next(&self, edges: Edges, copi: bool) -> (Self, Option<TransactionEvent>) {
        if edges.cs_fell {
            let event = match self {
                Self::Open { bits, .. } => TransactionEvent::Restarted { bits: *bits },
                Self::Complete { .. } => TransactionEvent::Restarted { bits: FRAME_BITS },
                Self::Idle | Self::Closed { .. } => TransactionEvent::Opened,
            };
            return (Self::opened(), Some(event));
        }

        let (state, event) = match *self {
            Self::Open { shift, bits } if edges.sclk_rose => Self::shift_in(shift, bits, copi),
            Self::Complete { .. } if edges.sclk_rose => {
                (*self, Some(TransactionEvent::IgnoredClock))
            }
            Self::Closed { .. } => (Self::Idle, None),
            _ => (*self, None),
        };

        if !edges.cs_rose {
            return (state, event);
        }

        match state {
            Self::Open { bits, .. } => (Self::Idle, Some(TransactionEvent::Truncated { bits })),
            Self::Complete { frame } => (Self::Closed { frame }, Some(TransactionEvent::Closed(frame))),
            Self::Idle | Self::Closed { .. } => (state, event),
        }
    }

    fn shift_in(shift: u16, bits: u8, copi: bool) -> (Self, Option<TransactionEvent>) {
        let shift = (shift << 1) | u16::from(copi);
        let bits = bits + 1;
        if bits == FRAME_BITS {
            let frame = Frame::from_bits(shift);
            (Self::Complete { frame }, Some(TransactionEvent::Completed(frame)))
        } else {
            (
                Self::Open { shift, bits },
                Some(TransactionEvent::BitShifted { bit: copi, bits }),
            )
        }
    }
}

impl std::fmt::Display for TransactionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Open { shift, bits } => write!(f, "open({bits}/{FRAME_BITS}, {shift:#06x})"),
            Self::Complete { frame } => write!(f, "complete({frame})"),
            Self::Closed { frame } => write!(f, "closed({frame})"),
        }
    }
}

impl std::fmt::Display for TransactionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Opened => write!(f, "opened"),
            Self::Restarted { bits } => write!(f, "restarted({bits})"),
            Self::BitShifted { bit, bits } => write!(f, "bit({}, {bits})", u8::from(*bit)),
            Self::Completed(frame) => write!(f, "completed({frame})"),
            Self::Truncated { bits } => write!(f, "truncated({bits})"),
            Self::Closed(frame) => write!(f, "closed({frame})"),
            Self::IgnoredClock => write!(f, "ignored_clock"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLOCK: Edges = Edges {
        sclk_rose: true,
        ..Edges::NONE
    };
    const FALL: Edges = Edges {
        cs_fell: true,
        ..Edges::NONE
    };
    const RISE: Edges = Edges {
        cs_rose: true,
        ..Edges::NONE
    };

    fn clock_in(mut state: TransactionState, frame: Frame) -> TransactionState {
        for bit in frame.bits_msb_first() {
            state = state.next(CLOCK, bit).0;
        }
        state
    }

    #[test]
    fn test_idle_ignores_clock() {
        let (state, event) = TransactionState::Idle.next(CLOCK, true);
        assert_eq!(state, TransactionState::Idle);
        assert_eq!(event, None);
    }

    #[test]
    fn test_open_on_fall() {
        let (state, event) = TransactionState::Idle.next(FALL, false);
        assert_eq!(state, TransactionState::opened());
        assert_eq!(event, Some(TransactionEvent::Opened));
        assert!(state.is_active());
        assert!(!state.frame_received());
    }

    #[test]
    fn test_first_bit_becomes_msb() {
        let frame = Frame::from_bits(0x8000);
        let state = clock_in(TransactionState::opened(), frame);
        assert_eq!(state, TransactionState::Complete { frame });
        assert_eq!(state.bit_count(), FRAME_BITS);
    }

    #[test]
    fn test_completes_on_sixteenth_bit() {
        let frame = Frame::new(0x02, 0x5A).unwrap();
        let mut state = TransactionState::opened();
        for (i, bit) in frame.bits_msb_first().enumerate() {
            let (next, event) = state.next(CLOCK, bit);
            if i + 1 < usize::from(FRAME_BITS) {
                assert!(matches!(event, Some(TransactionEvent::BitShifted { .. })));
                assert!(!next.frame_received());
            } else {
                assert_eq!(event, Some(TransactionEvent::Completed(frame)));
                assert_eq!(next.latched_frame(), Some(frame));
            }
            state = next;
        }
    }

    #[test]
    fn test_shift_register_moves_only_on_clock_while_open() {
        let mut state = TransactionState::opened();
        assert_eq!(state.shift_register(), 0);
        for (bit, expected) in [(true, 0b1), (false, 0b10), (true, 0b101)] {
            let (idle, _) = state.next(Edges::NONE, !bit);
            assert_eq!(idle.shift_register(), state.shift_register());
            state = state.next(CLOCK, bit).0;
            assert_eq!(state.shift_register(), expected);
        }
        assert_eq!(TransactionState::Idle.next(CLOCK, true).0.shift_register(), 0);

        let frame = Frame::new(0x04, 0xCF).unwrap();
        let complete = clock_in(TransactionState::opened(), frame);
        assert_eq!(complete.shift_register(), frame.bits());
        assert_eq!(complete.next(CLOCK, false).0.shift_register(), frame.bits());
    }

    #[test]
    fn test_extra_clocks_are_ignored() {
        let frame = Frame::new(0x04, 0xCF).unwrap();
        let complete = clock_in(TransactionState::opened(), frame);
        let (state, event) = complete.next(CLOCK, true);
        assert_eq!(state, complete);
        assert_eq!(event, Some(TransactionEvent::IgnoredClock));
    }

    #[test]
    fn test_rise_closes_complete_frame_for_one_tick() {
        let frame = Frame::new(0x01, 0xCC).unwrap();
        let complete = clock_in(TransactionState::opened(), frame);
        let (closed, event) = complete.next(RISE, false);
        assert_eq!(closed, TransactionState::Closed { frame });
        assert_eq!(event, Some(TransactionEvent::Closed(frame)));
        assert!(closed.commit_pending());
        assert!(!closed.is_active());

        let (after, event) = closed.next(Edges::NONE, false);
        assert_eq!(after, TransactionState::Idle);
        assert_eq!(event, None);
        assert!(!after.frame_received());
    }

    #[test]
    fn test_rise_truncates_partial_frame() {
        let mut state = TransactionState::opened();
        for _ in 0..9 {
            state = state.next(CLOCK, true).0;
        }
        let (state, event) = state.next(RISE, false);
        assert_eq!(state, TransactionState::Idle);
        assert_eq!(event, Some(TransactionEvent::Truncated { bits: 9 }));
    }

    #[test]
    fn test_fall_restarts_open_frame() {
        let mut state = TransactionState::opened();
        for _ in 0..5 {
            state = state.next(CLOCK, true).0;
        }
        let (state, event) = state.next(FALL, false);
        assert_eq!(state, TransactionState::opened());
        assert_eq!(event, Some(TransactionEvent::Restarted { bits: 5 }));
    }

    #[test]
    fn test_last_bit_and_rise_in_same_tick() {
        let frame = Frame::new(0x03, 0x81).unwrap();
        let mut state = TransactionState::opened();
        let bits: Vec<bool> = frame.bits_msb_first().collect();
        for bit in &bits[..15] {
            state = state.next(CLOCK, *bit).0;
        }
        let both = Edges {
            sclk_rose: true,
            cs_rose: true,
            ..Edges::NONE
        };
        let (state, _) = state.next(both, bits[15]);
        assert_eq!(state, TransactionState::Closed { frame });
    }

    #[test]
    fn test_fall_during_commit_tick_opens() {
        let frame = Frame::new(0x00, 0x01).unwrap();
        let (state, event) = TransactionState::Closed { frame }.next(FALL, false);
        assert_eq!(state, TransactionState::opened());
        assert_eq!(event, Some(TransactionEvent::Opened));
    }
}
