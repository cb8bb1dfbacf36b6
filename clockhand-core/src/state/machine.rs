//! State machine definition

use super::events::ClockEvent;

/// Controller states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockState {
    /// Hand at rest, showing the current time
    Idle,
    /// Following a regular minute tick
    Moving,
    /// Setting the hand to a requested time
    Adjusting,
    /// Hand position unknown; needs an external reset
    Error(FaultKind),
}

/// Reasons for entering [`ClockState::Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FaultKind {
    /// A motion was stopped before all its steps ran
    MotionInterrupted,
    /// The driver reported a hardware fault
    DriverFault,
}

impl ClockState {
    /// Check if a motion is outstanding
    pub fn is_busy(&self) -> bool {
        matches!(self, ClockState::Moving | ClockState::Adjusting)
    }

    /// Check if this is an error state
    pub fn is_error(&self) -> bool {
        matches!(self, ClockState::Error(_))
    }

    /// Process an event and return the next state
    pub fn transition(self, event: ClockEvent) -> Self {
        use ClockEvent::*;
        use ClockState::*;

        match (self, event) {
            // Faults win from anywhere, except an error already latched
            (Error(kind), DriverFault(_)) => Error(kind),
            (_, DriverFault(kind)) => Error(kind),

            (Idle, MinuteChanged) => Moving,
            (Idle, AdjustRequested) => Adjusting,

            (Moving, MotionComplete) => Idle,
            (Adjusting, MotionComplete) => Idle,

            (Error(_), Reset) => Idle,

            _ => self,
        }
    }
}
