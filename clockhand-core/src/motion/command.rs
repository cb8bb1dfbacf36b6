//! Step commands
//!
//! The only data that crosses the motion queue.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::traits::Direction;

/// A constant-rate move of the actuator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct StepCommand {
    /// Number of steps to execute
    pub steps: u32,
    /// Rotation direction
    pub direction: Direction,
    /// Time between steps in microseconds
    pub interval_us: u32,
}

impl StepCommand {
    /// Create a command
    pub fn new(steps: u32, direction: Direction, interval_us: u32) -> Self {
        Self {
            steps,
            direction,
            interval_us,
        }
    }

    /// Run for roughly `duration_ms` at a fixed step interval
    ///
    /// A zero interval is treated as one microsecond.
    pub fn for_duration(duration_ms: u32, direction: Direction, interval_us: u32) -> Self {
        let interval = interval_us.max(1);
        let steps = (u64::from(duration_ms) * 1000 / u64::from(interval)).min(u64::from(u32::MAX));
        Self::new(steps as u32, direction, interval)
    }

    /// Total duration in microseconds at the commanded interval
    pub fn duration_us(&self) -> u64 {
        u64::from(self.steps) * u64::from(self.interval_us)
    }

    /// Signed position change once the command completes
    pub fn displacement(&self) -> i64 {
        i64::from(self.steps) * self.direction.sign()
    }
}
