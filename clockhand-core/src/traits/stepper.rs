//! Stepper actuator traits
//!
//! The actuator is a unipolar stepper on four output lines, driven by a
//! periodic hardware alarm. These traits abstract the line bundle and the
//! alarm so the sequencer can be exercised on the host.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Motor rotation direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Direction {
    /// Clockwise rotation (phase table walked forward)
    Clockwise,
    /// Counter-clockwise rotation (phase table walked backward)
    CounterClockwise,
}

impl Direction {
    /// Get the opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }

    /// Build from a "clockwise" flag
    pub fn from_clockwise(cw: bool) -> Self {
        if cw {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        }
    }

    /// True for [`Direction::Clockwise`]
    pub fn is_clockwise(self) -> bool {
        self == Direction::Clockwise
    }

    /// Position change per executed step
    pub fn sign(self) -> i64 {
        match self {
            Direction::Clockwise => 1,
            Direction::CounterClockwise => -1,
        }
    }
}

/// Errors that can occur acquiring or driving the stepper hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StepperError {
    /// Alarm timer could not be acquired
    TimerUnavailable,
    /// Alarm timer cannot count in microseconds
    TimerResolution,
    /// Output lines could not be acquired
    OutputUnavailable,
    /// Invalid configuration
    InvalidConfig,
}

/// Four output lines written as one bundle
///
/// Implementations must update all four lines with a single write so the
/// coils never see an intermediate pattern.
pub trait PhaseOutput {
    /// Write the low 4 bits of `code`; bit `i` drives line `i`
    ///
    /// A code of `0` de-energizes every coil.
    fn write_phase(&mut self, code: u8);
}

/// Periodic alarm source with microsecond resolution
///
/// On every alarm the owner calls [`crate::motion::StepperDriver::on_alarm`]
/// from interrupt context until it returns [`crate::motion::AlarmAction::Halt`].
pub trait AlarmTimer {
    /// Acquire and validate the timer
    ///
    /// Called once while the driver is built. An error here means the
    /// actuator cannot be driven at all.
    fn enable(&mut self) -> Result<(), StepperError>;

    /// Start (or restart) a periodic alarm
    ///
    /// The counter is reset, so the first alarm fires `period_us` after this
    /// call and then every `period_us` (auto-reload).
    fn start(&mut self, period_us: u32);

    /// Stop the alarm
    ///
    /// Calling this while already stopped is a no-op.
    fn stop(&mut self);
}
