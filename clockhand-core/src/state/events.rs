//! Events that trigger state transitions

use super::machine::FaultKind;

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockEvent {
    /// The time source moved on to a new minute
    MinuteChanged,
    /// Someone asked for the hand to be set to a new time
    AdjustRequested,
    /// The submitted motion finished
    MotionComplete,
    /// The actuator could not follow a command
    DriverFault(FaultKind),
    /// External reset out of an error
    Reset,
}
