//! Motion control
//!
//! Leaves first: the half-step phase table, the phase sequencer that runs
//! on every alarm, the stepper driver that owns the hardware, step
//! commands and the profiles that produce them, and the bounded queue that
//! hands commands from producers to the single executor.

pub mod command;
pub mod driver;
pub mod phase;
pub mod profile;
pub mod queue;
pub mod sequencer;

pub use command::StepCommand;
pub use driver::{DriverConfig, MotionReport, StepperDriver, DEFAULT_MIN_INTERVAL_US};
pub use phase::{PhaseIndex, PHASE_COUNT, PHASE_OFF, PHASE_TABLE};
pub use profile::{MotionProfile, ProfileError};
pub use queue::{CompletionFlag, MotionExecutor, MotionQueue, MOTION_QUEUE_DEPTH};
pub use sequencer::{AlarmAction, MotorMotion};
