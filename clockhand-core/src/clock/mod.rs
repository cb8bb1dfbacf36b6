//! Clock-face model and hand controller
//!
//! Converts time of day into a dial angle, finds the shortest rotation
//! between two readings, and drives the hand through the motion queue.

pub mod angle;
pub mod controller;
pub mod time;

pub use angle::{angle, normalize_delta, AngleDelta};
pub use controller::{ClockController, ClockError, MoveSummary, TickOutcome};
pub use time::{ClockTime, TimeError, SECONDS_PER_DAY};
