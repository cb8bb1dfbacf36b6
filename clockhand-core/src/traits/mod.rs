//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and hardware-specific implementations.

pub mod stepper;
pub mod time;

pub use stepper::{AlarmTimer, Direction, PhaseOutput, StepperError};
pub use time::TimeSource;
