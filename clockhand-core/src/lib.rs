//! Board-agnostic core logic for the stepper clock firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Hardware abstraction traits (phase outputs, alarm timer, time source)
//! - Phase sequencer and stepper driver (interrupt-context stepping)
//! - Motion queue and executor (task-level command hand-off)
//! - Clock angle math and the clock controller
//! - State machine for hand movement
//! - Configuration types and the `clock.toml` parser

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod clock;
pub mod config;
pub mod motion;
pub mod state;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;
