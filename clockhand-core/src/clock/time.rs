//! Time of day

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Seconds in one day
pub const SECONDS_PER_DAY: u32 = 24 * 60 * 60;

/// Invalid time of day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimeError {
    /// Hour outside 0..=23
    Hour,
    /// Minute outside 0..=59
    Minute,
    /// Second outside 0..=59
    Second,
    /// Not in `HH:MM` or `HH:MM:SS` form
    Format,
}

/// A wall-clock reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClockTime {
    hour: u8,
    minute: u8,
    second: u8,
}

impl ClockTime {
    /// Midnight
    pub const MIDNIGHT: Self = Self {
        hour: 0,
        minute: 0,
        second: 0,
    };

    /// Create a validated time
    pub fn new(hour: u8, minute: u8, second: u8) -> Result<Self, TimeError> {
        if hour > 23 {
            return Err(TimeError::Hour);
        }
        if minute > 59 {
            return Err(TimeError::Minute);
        }
        if second > 59 {
            return Err(TimeError::Second);
        }
        Ok(Self {
            hour,
            minute,
            second,
        })
    }

    /// Create from hour and minute, seconds zero
    pub fn hm(hour: u8, minute: u8) -> Result<Self, TimeError> {
        Self::new(hour, minute, 0)
    }

    /// Time of day for a count of seconds, wrapping at midnight
    pub fn from_seconds_of_day(seconds: u32) -> Self {
        let s = seconds % SECONDS_PER_DAY;
        Self {
            hour: (s / 3600) as u8,
            minute: ((s / 60) % 60) as u8,
            second: (s % 60) as u8,
        }
    }

    /// Parse `HH:MM` or `HH:MM:SS`
    pub fn parse(text: &str) -> Result<Self, TimeError> {
        let mut parts = text.trim().split(':');
        let mut field = || -> Result<Option<u8>, TimeError> {
            match parts.next() {
                None => Ok(None),
                Some(p) if p.is_empty() || p.len() > 2 => Err(TimeError::Format),
                Some(p) => p.parse().map(Some).map_err(|_| TimeError::Format),
            }
        };

        let hour = field()?.ok_or(TimeError::Format)?;
        let minute = field()?.ok_or(TimeError::Format)?;
        let second = field()?.unwrap_or(0);
        if field()?.is_some() {
            return Err(TimeError::Format);
        }
        Self::new(hour, minute, second)
    }

    /// Hour, 0..=23
    pub fn hour(&self) -> u8 {
        self.hour
    }

    /// Minute, 0..=59
    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// Second, 0..=59
    pub fn second(&self) -> u8 {
        self.second
    }

    /// Seconds since midnight
    pub fn seconds_of_day(&self) -> u32 {
        u32::from(self.hour) * 3600 + u32::from(self.minute) * 60 + u32::from(self.second)
    }

    /// True if hour and minute match (seconds ignored)
    pub fn same_minute(&self, other: &Self) -> bool {
        self.hour == other.hour && self.minute == other.minute
    }

    /// Dial angle in degrees, see [`crate::clock::angle()`]
    pub fn angle(&self) -> f32 {
        super::angle::angle(self.hour, self.minute)
    }
}
