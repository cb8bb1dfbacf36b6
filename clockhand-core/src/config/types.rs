//! Configuration type definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::clock::ClockTime;
use crate::motion::{DriverConfig, MotionProfile, DEFAULT_MIN_INTERVAL_US};

/// Number of motor lines
pub const MOTOR_PINS: usize = 4;

/// Highest usable GPIO number (RP2040: GPIO0..=GPIO29)
pub const MAX_GPIO: u8 = 29;

/// Longest watchdog period the RP2040 supports
pub const WATCHDOG_MAX_MS: u32 = 8388;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `steps_per_rev` is zero
    ZeroStepsPerRev,
    /// `min_interval_us` is zero
    ZeroMinInterval,
    /// A rate is zero, negative or not finite
    InvalidRpm,
    /// `check_interval_ms` is zero
    ZeroCheckInterval,
    /// Watchdog period beyond what the hardware supports
    WatchdogTooLong,
    /// Watchdog would fire between two clock checks
    WatchdogTooShort,
    /// Watchdog would fire during a half-turn move plus one clock check
    WatchdogShorterThanMove,
    /// Pin number beyond [`MAX_GPIO`]
    PinOutOfRange(u8),
    /// The same pin is used twice
    DuplicatePin(u8),
}

/// Stepper motor wiring and geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MotorConfig {
    /// GPIO numbers for coil lines A..D; line `i` is bit `i` of a phase code
    pub pins: [u8; MOTOR_PINS],
    /// Steps per output revolution (28BYJ-48 half-stepping: 4096)
    pub steps_per_rev: u32,
    /// Shortest step interval in microseconds
    pub min_interval_us: u32,
}

impl Default for MotorConfig {
    fn default() -> Self {
        Self {
            pins: [4, 5, 6, 7],
            steps_per_rev: 4096,
            min_interval_us: DEFAULT_MIN_INTERVAL_US,
        }
    }
}

/// Clock behavior
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClockSettings {
    /// Rate for regular minute moves
    pub tick_rpm: f32,
    /// Rate for time-set moves
    pub adjust_rpm: f32,
    /// How often the time source is read
    pub check_interval_ms: u32,
    /// Time the hand shows at power-on
    pub hand_time: ClockTime,
    /// Wall-clock reading at power-on, until something adjusts it
    pub start_time: ClockTime,
    /// Watchdog period, 0 disables
    pub watchdog_timeout_ms: u32,
}

impl Default for ClockSettings {
    fn default() -> Self {
        let noon = ClockTime::from_seconds_of_day(12 * 3600);
        Self {
            tick_rpm: 6.0,
            adjust_rpm: 10.0,
            check_interval_ms: 1000,
            hand_time: noon,
            start_time: noon,
            watchdog_timeout_ms: 8000,
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClockConfig {
    pub motor: MotorConfig,
    pub clock: ClockSettings,
}

impl ClockConfig {
    /// Check the configuration can drive the hardware
    pub fn validate(&self) -> Result<(), ConfigError> {
        let motor = &self.motor;
        if motor.steps_per_rev == 0 {
            return Err(ConfigError::ZeroStepsPerRev);
        }
        if motor.min_interval_us == 0 {
            return Err(ConfigError::ZeroMinInterval);
        }
        for (i, &pin) in motor.pins.iter().enumerate() {
            if pin > MAX_GPIO {
                return Err(ConfigError::PinOutOfRange(pin));
            }
            if motor.pins[..i].contains(&pin) {
                return Err(ConfigError::DuplicatePin(pin));
            }
        }

        let clock = &self.clock;
        for rpm in [clock.tick_rpm, clock.adjust_rpm] {
            if !rpm.is_finite() || rpm <= 0.0 {
                return Err(ConfigError::InvalidRpm);
            }
        }
        if clock.check_interval_ms == 0 {
            return Err(ConfigError::ZeroCheckInterval);
        }
        if clock.watchdog_timeout_ms > WATCHDOG_MAX_MS {
            return Err(ConfigError::WatchdogTooLong);
        }
        if clock.watchdog_timeout_ms != 0 && clock.watchdog_timeout_ms <= clock.check_interval_ms {
            return Err(ConfigError::WatchdogTooShort);
        }
        if clock.watchdog_timeout_ms != 0 {
            // Not fed while a move is in flight, nor until the next check
            let starved_us = self.longest_move_us()? + u64::from(clock.check_interval_ms) * 1000;
            if starved_us >= u64::from(clock.watchdog_timeout_ms) * 1000 {
                return Err(ConfigError::WatchdogShorterThanMove);
            }
        }
        Ok(())
    }

    /// Duration of the longest single move: half a revolution at the
    /// slower of the two rates
    pub fn longest_move_us(&self) -> Result<u64, ConfigError> {
        let tick = self.tick_profile()?.interval_us();
        let adjust = self.adjust_profile()?.interval_us();
        let interval = tick.max(adjust).max(self.motor.min_interval_us);
        Ok(u64::from(self.motor.steps_per_rev / 2) * u64::from(interval))
    }

    pub fn driver_config(&self) -> DriverConfig {
        DriverConfig {
            min_interval_us: self.motor.min_interval_us,
        }
    }

    /// Profile for minute moves
    pub fn tick_profile(&self) -> Result<MotionProfile, ConfigError> {
        MotionProfile::new(self.motor.steps_per_rev, self.clock.tick_rpm)
            .map_err(|_| ConfigError::InvalidRpm)
    }

    /// Profile for time-set moves
    pub fn adjust_profile(&self) -> Result<MotionProfile, ConfigError> {
        MotionProfile::new(self.motor.steps_per_rev, self.clock.adjust_rpm)
            .map_err(|_| ConfigError::InvalidRpm)
    }

    /// Watchdog period, `None` when disabled
    pub fn watchdog_ms(&self) -> Option<u32> {
        match self.clock.watchdog_timeout_ms {
            0 => None,
            ms => Some(ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ClockConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.tick_profile().unwrap().interval_us(), 2441);
        assert_eq!(config.adjust_profile().unwrap().interval_us(), 1464);
        assert_eq!(config.driver_config(), DriverConfig::default());
        assert_eq!(config.watchdog_ms(), Some(8000));
    }

    #[test]
    fn test_rejects_bad_motor() {
        let mut config = ClockConfig::default();
        config.motor.steps_per_rev = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroStepsPerRev));

        let mut config = ClockConfig::default();
        config.motor.min_interval_us = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroMinInterval));
    }

    #[test]
    fn test_rejects_bad_pins() {
        let mut config = ClockConfig::default();
        config.motor.pins = [2, 3, 30, 4];
        assert_eq!(config.validate(), Err(ConfigError::PinOutOfRange(30)));

        config.motor.pins = [2, 3, 4, 3];
        assert_eq!(config.validate(), Err(ConfigError::DuplicatePin(3)));
    }

    #[test]
    fn test_rejects_bad_rpm() {
        let mut config = ClockConfig::default();
        config.clock.tick_rpm = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidRpm));

        let mut config = ClockConfig::default();
        config.clock.adjust_rpm = -2.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidRpm));
        assert_eq!(config.adjust_profile(), Err(ConfigError::InvalidRpm));
    }

    #[test]
    fn test_watchdog_bounds() {
        let mut config = ClockConfig::default();
        config.clock.watchdog_timeout_ms = 0;
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.watchdog_ms(), None);

        config.clock.watchdog_timeout_ms = 9000;
        assert_eq!(config.validate(), Err(ConfigError::WatchdogTooLong));

        config.clock.watchdog_timeout_ms = 1000;
        assert_eq!(config.validate(), Err(ConfigError::WatchdogTooShort));
    }

    #[test]
    fn test_watchdog_must_outlast_half_turn() {
        let config = ClockConfig::default();
        // 2048 steps at the 6 RPM tick rate
        assert_eq!(config.longest_move_us(), Ok(2048 * 2441));

        let mut config = ClockConfig::default();
        config.clock.adjust_rpm = 1.0;
        assert_eq!(config.longest_move_us(), Ok(2048 * 14648));
        assert_eq!(config.validate(), Err(ConfigError::WatchdogShorterThanMove));

        config.clock.watchdog_timeout_ms = 0;
        assert_eq!(config.validate(), Ok(()));

        let mut config = ClockConfig::default();
        config.clock.check_interval_ms = 3100;
        assert_eq!(config.validate(), Err(ConfigError::WatchdogShorterThanMove));
        config.clock.check_interval_ms = 3000;
        assert_eq!(config.validate(), Ok(()));
    }
}
