//! Uptime-based time source

use embassy_time::Instant;

use clockhand_core::clock::{ClockTime, SECONDS_PER_DAY};
use clockhand_core::traits::TimeSource;

/// Wall clock built from a known reading plus uptime
///
/// Wraps at midnight. Without an external time source this drifts with
/// the crystal.
pub struct UptimeClock {
    base: ClockTime,
    since: Instant,
}

impl UptimeClock {
    pub fn new(start: ClockTime) -> Self {
        Self {
            base: start,
            since: Instant::now(),
        }
    }

    /// Rebase on a new reading taken now
    pub fn set(&mut self, time: ClockTime) {
        self.base = time;
        self.since = Instant::now();
    }
}

impl TimeSource for UptimeClock {
    fn now(&mut self) -> ClockTime {
        let elapsed = (self.since.elapsed().as_secs() % u64::from(SECONDS_PER_DAY)) as u32;
        ClockTime::from_seconds_of_day(self.base.seconds_of_day() + elapsed)
    }
}
