//! Phase sequencer
//!
//! The per-alarm stepping routine. It runs in interrupt context, so it
//! only does bounded work: one bundle write and a few counter updates.

use super::phase::{PhaseIndex, PHASE_OFF};
use crate::traits::{Direction, PhaseOutput};

/// What the alarm source should do after an alarm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlarmAction {
    /// Keep the periodic alarm running
    Continue,
    /// Stop the alarm; the motion is finished
    Halt,
}

/// Motion state of the single actuator
///
/// Shared between the alarm handler and task-level callers, so it lives
/// inside [`crate::motion::StepperDriver`] and is only touched under the
/// driver's critical section. Copies handed out by the driver are
/// snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotorMotion {
    total_steps: u32,
    executed_steps: u32,
    step_index: PhaseIndex,
    last_written: Option<PhaseIndex>,
    direction: Direction,
    absolute_position: i64,
}

impl Default for MotorMotion {
    fn default() -> Self {
        Self::new()
    }
}

impl MotorMotion {
    /// Idle motion at position zero
    pub const fn new() -> Self {
        Self {
            total_steps: 0,
            executed_steps: 0,
            step_index: PhaseIndex::new(0),
            last_written: None,
            direction: Direction::Clockwise,
            absolute_position: 0,
        }
    }

    /// Steps requested by the current command
    pub fn total_steps(&self) -> u32 {
        self.total_steps
    }

    /// Steps executed so far for the current command
    pub fn executed_steps(&self) -> u32 {
        self.executed_steps
    }

    /// Steps still to go for the current command
    pub fn remaining_steps(&self) -> u32 {
        self.total_steps.saturating_sub(self.executed_steps)
    }

    /// Next phase table entry to be written
    pub fn step_index(&self) -> PhaseIndex {
        self.step_index
    }

    /// Last phase table entry written, `None` before the first step
    pub fn last_written(&self) -> Option<PhaseIndex> {
        self.last_written
    }

    /// Direction of the current command
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Absolute position in steps
    pub fn absolute_position(&self) -> i64 {
        self.absolute_position
    }

    /// True while steps remain
    pub fn is_moving(&self) -> bool {
        self.executed_steps < self.total_steps
    }

    /// Replace the current target
    ///
    /// Remaining steps of a displaced command are dropped and the position
    /// carries over. The next phase written is the neighbour, in the new
    /// direction, of the last phase written, so a reversal steps back one
    /// entry instead of jumping over the rotor.
    pub fn retarget(&mut self, steps: u32, direction: Direction) {
        self.total_steps = steps;
        self.executed_steps = 0;
        self.direction = direction;
        if let Some(last) = self.last_written {
            self.step_index = last.advance(direction);
        }
    }

    /// Cut the current command short, returning how many steps were dropped
    pub fn halt(&mut self) -> u32 {
        let remaining = self.remaining_steps();
        self.total_steps = self.executed_steps;
        remaining
    }

    /// Overwrite the absolute position without moving
    pub fn set_position(&mut self, value: i64) {
        self.absolute_position = value;
    }

    /// Run one alarm
    ///
    /// Finished: writes [`PHASE_OFF`] and returns [`AlarmAction::Halt`].
    /// Otherwise writes the current phase, steps the index and position
    /// once in the commanded direction and returns
    /// [`AlarmAction::Continue`].
    pub fn advance<O: PhaseOutput>(&mut self, output: &mut O) -> AlarmAction {
        if self.executed_steps >= self.total_steps {
            output.write_phase(PHASE_OFF);
            return AlarmAction::Halt;
        }

        output.write_phase(self.step_index.code());
        self.last_written = Some(self.step_index);
        self.step_index = self.step_index.advance(self.direction);
        self.absolute_position = self.absolute_position.wrapping_add(self.direction.sign());
        self.executed_steps += 1;
        AlarmAction::Continue
    }
}
