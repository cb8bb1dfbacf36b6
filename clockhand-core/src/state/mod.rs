//! Clock controller state machine
//!
//! The controller's behavior is a pure function of its state and an
//! event; the async plumbing lives in [`crate::clock::controller`].

pub mod events;
pub mod machine;

pub use events::ClockEvent;
pub use machine::{ClockState, FaultKind};
