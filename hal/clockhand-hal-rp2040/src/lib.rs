//! RP2040 bindings for the stepper clock hand
//!
//! This crate implements the `clockhand-core` hardware traits on the
//! RP2040:
//!
//! - Config-driven GPIO allocation
//! - Four coil lines written with one SIO register access
//! - A microsecond step alarm driven by an `embassy-time` ticker

#![no_std]

pub mod alarm;
pub mod phase_bundle;
pub mod pins;

pub use alarm::{run_alarm, AlarmControl, AlarmSignal, TickerAlarm};
pub use phase_bundle::PhaseBundle;
pub use pins::{PinBank, PinError};
