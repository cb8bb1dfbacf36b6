//! Half-step phase table
//!
//! Eight output patterns for a 4-wire unipolar stepper (28BYJ-48 style).
//! Walking the table forward turns the rotor clockwise, backward turns it
//! counter-clockwise. Neighbouring entries, including the wrap from the
//! last entry back to the first, differ in exactly one bit.

use crate::traits::Direction;

/// Number of entries in the phase table
pub const PHASE_COUNT: usize = 8;

/// Half-step output patterns, bit `i` drives coil line `i`
pub const PHASE_TABLE: [u8; PHASE_COUNT] = [0x08, 0x0C, 0x04, 0x06, 0x02, 0x03, 0x01, 0x09];

/// All coils de-energized
pub const PHASE_OFF: u8 = 0x00;

/// Position within [`PHASE_TABLE`], always in `0..8`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhaseIndex(u8);

impl PhaseIndex {
    /// Create an index, wrapping values past the end of the table
    pub const fn new(index: u8) -> Self {
        Self(index & 0x07)
    }

    /// Raw index value
    pub fn get(self) -> u8 {
        self.0
    }

    /// Output pattern at this index
    pub fn code(self) -> u8 {
        PHASE_TABLE[self.0 as usize]
    }

    /// Next index for one step in `direction`
    ///
    /// Wraps explicitly: stepping forward from 7 gives 0, stepping back
    /// from 0 gives 7.
    pub fn advance(self, direction: Direction) -> Self {
        match direction {
            Direction::Clockwise => {
                if self.0 >= 7 {
                    Self(0)
                } else {
                    Self(self.0 + 1)
                }
            }
            Direction::CounterClockwise => {
                if self.0 == 0 {
                    Self(7)
                } else {
                    Self(self.0 - 1)
                }
            }
        }
    }
}
