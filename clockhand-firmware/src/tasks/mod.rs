//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod alarm;
pub mod clock;
pub mod stepper;

pub use alarm::alarm_task;
pub use clock::{clock_task, ClockTaskConfig};
pub use stepper::stepper_task;
