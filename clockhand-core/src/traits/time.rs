//! Wall-clock time source

use crate::clock::ClockTime;

/// Source of the current wall-clock time
///
/// Successive readings must be non-decreasing modulo a day. Network time
/// sync and RTC handling live outside this crate; they only need to
/// implement this trait.
pub trait TimeSource {
    /// Read the current time of day
    fn now(&mut self) -> ClockTime;
}
