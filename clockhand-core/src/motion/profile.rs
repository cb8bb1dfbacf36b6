//! Motion profiles
//!
//! A profile pairs the actuator's steps per revolution with a target
//! angular rate and turns angles (or pairs of clock readings) into
//! [`StepCommand`]s.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::command::StepCommand;
use crate::clock::{AngleDelta, ClockTime};
use crate::traits::Direction;

/// Microseconds per minute
const US_PER_MINUTE: f32 = 60_000_000.0;

/// Invalid profile parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProfileError {
    /// Steps per revolution is zero
    ZeroSteps,
    /// Rate is zero, negative or not finite
    InvalidRpm,
}

/// Constant-rate motion profile
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotionProfile {
    steps_per_rev: u32,
    rpm: f32,
}

impl MotionProfile {
    /// Create a validated profile
    pub fn new(steps_per_rev: u32, rpm: f32) -> Result<Self, ProfileError> {
        if steps_per_rev == 0 {
            return Err(ProfileError::ZeroSteps);
        }
        if !rpm.is_finite() || rpm <= 0.0 {
            return Err(ProfileError::InvalidRpm);
        }
        Ok(Self { steps_per_rev, rpm })
    }

    /// Steps per output revolution
    pub fn steps_per_rev(&self) -> u32 {
        self.steps_per_rev
    }

    /// Target rate in revolutions per minute
    pub fn rpm(&self) -> f32 {
        self.rpm
    }

    /// Step interval for the target rate, truncated, at least 1 µs
    pub fn interval_us(&self) -> u32 {
        let interval = US_PER_MINUTE / (self.rpm * self.steps_per_rev as f32);
        (interval as u32).max(1)
    }

    /// Steps covering `degrees` of rotation, rounded to the nearest step
    pub fn steps_for_degrees(&self, degrees: f32) -> u32 {
        libm::roundf(libm::fabsf(degrees) / 360.0 * self.steps_per_rev as f32) as u32
    }

    /// Command for an already normalized rotation
    pub fn command_for(&self, delta: AngleDelta) -> StepCommand {
        self.rotate(delta.degrees, delta.direction)
    }

    /// Rotate by `degrees` in `direction`
    pub fn rotate(&self, degrees: f32, direction: Direction) -> StepCommand {
        StepCommand::new(
            self.steps_for_degrees(degrees),
            direction,
            self.interval_us(),
        )
    }

    /// Quantized dial position for an angle, in `[0, steps_per_rev)`
    pub fn dial_steps(&self, angle: f32) -> i64 {
        let spr = i64::from(self.steps_per_rev);
        let raw = libm::roundf(libm::fmodf(angle, 360.0) / 360.0 * self.steps_per_rev as f32);
        (raw as i64).rem_euclid(spr)
    }

    /// Quantized dial position of the hand at `time`
    pub fn dial_steps_for_time(&self, time: ClockTime) -> i64 {
        self.dial_steps(time.angle())
    }

    /// Signed shortest move between two dial positions
    ///
    /// Exactly half a turn resolves clockwise.
    pub fn shortest_steps(&self, from: i64, to: i64) -> i64 {
        let spr = i64::from(self.steps_per_rev);
        let diff = (to - from).rem_euclid(spr);
        if diff * 2 > spr {
            diff - spr
        } else {
            diff
        }
    }

    /// Move the hand from `old` to `new`
    ///
    /// Direction follows the normalized degree delta. The step count is the
    /// distance between the two quantized dial positions in that
    /// direction, so chained moves land on the same step as one long move.
    pub fn command_between(&self, old: ClockTime, new: ClockTime) -> (AngleDelta, StepCommand) {
        let delta = AngleDelta::between(old, new);
        let spr = i64::from(self.steps_per_rev);
        let raw = self.dial_steps_for_time(new) - self.dial_steps_for_time(old);
        let steps = match delta.direction {
            Direction::Clockwise => raw.rem_euclid(spr),
            Direction::CounterClockwise => (-raw).rem_euclid(spr),
        };
        let cmd = StepCommand::new(steps as u32, delta.direction, self.interval_us());
        (delta, cmd)
    }

    /// Move from an absolute step position to a dial angle
    ///
    /// Only the position modulo one revolution matters; the shortest path
    /// is taken.
    pub fn command_to_angle(&self, position: i64, target: f32) -> StepCommand {
        let current = position.rem_euclid(i64::from(self.steps_per_rev));
        let diff = self.shortest_steps(current, self.dial_steps(target));
        let direction = Direction::from_clockwise(diff >= 0);
        StepCommand::new(diff.unsigned_abs() as u32, direction, self.interval_us())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> MotionProfile {
        MotionProfile::new(4096, 6.0).unwrap()
    }

    fn t(hour: u8, minute: u8) -> ClockTime {
        ClockTime::hm(hour, minute).unwrap()
    }

    #[test]
    fn test_new_rejects_bad_parameters() {
        assert_eq!(MotionProfile::new(0, 6.0), Err(ProfileError::ZeroSteps));
        assert_eq!(MotionProfile::new(4096, 0.0), Err(ProfileError::InvalidRpm));
        assert_eq!(MotionProfile::new(4096, -1.0), Err(ProfileError::InvalidRpm));
        assert_eq!(
            MotionProfile::new(4096, f32::NAN),
            Err(ProfileError::InvalidRpm)
        );
    }

    #[test]
    fn test_interval_from_rpm() {
        // 60e6 / (6 * 4096) = 2441.4
        assert_eq!(profile().interval_us(), 2441);
        // 60e6 / (10 * 4096) = 1464.8
        assert_eq!(MotionProfile::new(4096, 10.0).unwrap().interval_us(), 1464);
        assert_eq!(MotionProfile::new(4096, 1.0e9).unwrap().interval_us(), 1);
    }

    #[test]
    fn test_steps_for_degrees() {
        let p = profile();
        assert_eq!(p.steps_for_degrees(360.0), 4096);
        assert_eq!(p.steps_for_degrees(90.0), 1024);
        assert_eq!(p.steps_for_degrees(-90.0), 1024);
        // 0.5° = 5.69 steps
        assert_eq!(p.steps_for_degrees(0.5), 6);
        assert_eq!(p.steps_for_degrees(0.0), 0);
    }

    #[test]
    fn test_rotate() {
        let cmd = profile().rotate(45.0, Direction::CounterClockwise);
        assert_eq!(cmd.steps, 512);
        assert_eq!(cmd.direction, Direction::CounterClockwise);
        assert_eq!(cmd.interval_us, 2441);
    }

    #[test]
    fn test_command_between_midnight() {
        let (delta, cmd) = profile().command_between(t(11, 59), t(0, 0));
        assert_eq!(delta.direction, Direction::Clockwise);
        assert_eq!(delta.degrees, 0.5);
        assert_eq!(cmd.direction, Direction::Clockwise);
        assert_eq!(cmd.steps, 6);
    }

    #[test]
    fn test_command_between_counter_clockwise() {
        let (delta, cmd) = profile().command_between(t(3, 0), t(0, 0));
        assert_eq!(delta.direction, Direction::CounterClockwise);
        assert_eq!(cmd.direction, Direction::CounterClockwise);
        assert_eq!(cmd.steps, 1024);
    }

    #[test]
    fn test_minute_moves_do_not_drift() {
        let p = profile();
        let mut total = 0u32;
        for minute in 0..59 {
            let (_, cmd) = p.command_between(t(0, minute), t(0, minute + 1));
            assert_eq!(cmd.direction, Direction::Clockwise);
            total += cmd.steps;
        }
        let (_, cmd) = p.command_between(t(0, 59), t(1, 0));
        total += cmd.steps;

        // 30° = 341.33 steps, quantized once
        assert_eq!(total, 341);
        assert_eq!(i64::from(total), p.dial_steps_for_time(t(1, 0)));
    }

    #[test]
    fn test_dial_steps_wrap() {
        let p = profile();
        assert_eq!(p.dial_steps(0.0), 0);
        assert_eq!(p.dial_steps(359.99), 0);
        assert_eq!(p.dial_steps(450.0), 1024);
        assert_eq!(p.dial_steps(-90.0), 3072);
    }

    #[test]
    fn test_shortest_steps() {
        let p = profile();
        assert_eq!(p.shortest_steps(0, 10), 10);
        assert_eq!(p.shortest_steps(10, 0), -10);
        assert_eq!(p.shortest_steps(4090, 6), 12);
        assert_eq!(p.shortest_steps(0, 2048), 2048);
        assert_eq!(p.shortest_steps(0, 2049), -2047);
    }

    #[test]
    fn test_command_to_angle_uses_position_modulo_revolution() {
        let p = profile();
        let cmd = p.command_to_angle(4096 * 3 + 1024, 0.0);
        assert_eq!(cmd.direction, Direction::CounterClockwise);
        assert_eq!(cmd.steps, 1024);

        let cmd = p.command_to_angle(-10, 0.0);
        assert_eq!(cmd.direction, Direction::Clockwise);
        assert_eq!(cmd.steps, 10);
    }
}
