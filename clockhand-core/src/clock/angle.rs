//! Dial angle math
//!
//! The hand makes one revolution every 12 hours: 30° per hour plus 0.5°
//! per minute.

use super::time::ClockTime;
use crate::traits::Direction;

/// Dial angle for an hour and minute, in `[0, 360)` degrees
///
/// Minutes past 59 carry into the hour, so out-of-range input still lands
/// on the dial.
pub fn angle(hour: u8, minute: u8) -> f32 {
    let minutes = (u32::from(hour) * 60 + u32::from(minute)) % (12 * 60);
    minutes as f32 * 0.5
}

/// Fold a raw angle difference into `[-180, 180]`
///
/// Inputs are differences of two dial angles, so they lie in
/// `(-360, 360)` and one correction is enough.
pub fn normalize_delta(delta: f32) -> f32 {
    if delta > 180.0 {
        delta - 360.0
    } else if delta < -180.0 {
        delta + 360.0
    } else {
        delta
    }
}

/// Shortest rotation between two dial positions
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AngleDelta {
    /// Rotation direction
    pub direction: Direction,
    /// Magnitude in degrees, `[0, 180]`
    pub degrees: f32,
}

impl AngleDelta {
    /// Build from a signed, already normalized difference
    ///
    /// Non-negative values rotate clockwise.
    pub fn from_signed(delta: f32) -> Self {
        if delta >= 0.0 {
            Self {
                direction: Direction::Clockwise,
                degrees: delta,
            }
        } else {
            Self {
                direction: Direction::CounterClockwise,
                degrees: -delta,
            }
        }
    }

    /// Shortest-path rotation from `old` to `new`
    pub fn between(old: ClockTime, new: ClockTime) -> Self {
        Self::from_signed(normalize_delta(new.angle() - old.angle()))
    }

    /// Signed value, negative for counter-clockwise
    pub fn signed(&self) -> f32 {
        match self.direction {
            Direction::Clockwise => self.degrees,
            Direction::CounterClockwise => -self.degrees,
        }
    }
}
