//! Minimal TOML reader for `clock.toml`
//!
//! Handles only the subset the clock configuration uses:
//! - `[motor]` and `[clock]` section headers
//! - `key = value` with integer, float, quoted string and integer array
//!   values
//! - `#` comments, full-line or trailing
//!
//! Keys missing from the input keep their defaults. Unknown sections and
//! keys are rejected.

use heapless::Vec;

use super::types::{ClockConfig, MOTOR_PINS};
use crate::clock::ClockTime;

/// What went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseErrorKind {
    /// Header other than `[motor]` or `[clock]`
    UnknownSection,
    /// Key not valid in its section
    UnknownKey,
    /// Line is neither a header nor `key = value`
    Syntax,
    /// Number could not be parsed
    InvalidNumber,
    /// Time is not `"HH:MM"` or `"HH:MM:SS"`
    InvalidTime,
    /// Pin list is not `[a, b, c, d]`
    InvalidPins,
}

/// Parse error with its 1-based line number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Motor,
    Clock,
}

/// Parse a configuration, starting from [`ClockConfig::default`]
///
/// The result is not validated; call [`ClockConfig::validate`].
pub fn parse_config(input: &str) -> Result<ClockConfig, ParseError> {
    let mut config = ClockConfig::default();
    let mut section = Section::Root;

    for (index, raw) in input.lines().enumerate() {
        let at = |kind| ParseError {
            kind,
            line: index + 1,
        };
        let line = strip_comment(raw).trim();
        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            section = match header.trim() {
                "motor" => Section::Motor,
                "clock" => Section::Clock,
                _ => return Err(at(ParseErrorKind::UnknownSection)),
            };
            continue;
        }

        let (key, value) = split_key_value(line).ok_or(at(ParseErrorKind::Syntax))?;
        apply_value(&mut config, section, key, value).map_err(at)?;
    }

    Ok(config)
}

fn apply_value(
    config: &mut ClockConfig,
    section: Section,
    key: &str,
    value: &str,
) -> Result<(), ParseErrorKind> {
    match (section, key) {
        (Section::Motor, "pins") => config.motor.pins = parse_pins(value)?,
        (Section::Motor, "steps_per_rev") => config.motor.steps_per_rev = parse_number(value)?,
        (Section::Motor, "min_interval_us") => config.motor.min_interval_us = parse_number(value)?,

        (Section::Clock, "tick_rpm") => config.clock.tick_rpm = parse_number(value)?,
        (Section::Clock, "adjust_rpm") => config.clock.adjust_rpm = parse_number(value)?,
        (Section::Clock, "check_interval_ms") => {
            config.clock.check_interval_ms = parse_number(value)?
        }
        (Section::Clock, "hand_time") => config.clock.hand_time = parse_time(value)?,
        (Section::Clock, "start_time") => config.clock.start_time = parse_time(value)?,
        (Section::Clock, "watchdog_timeout_ms") => {
            config.clock.watchdog_timeout_ms = parse_number(value)?
        }

        _ => return Err(ParseErrorKind::UnknownKey),
    }
    Ok(())
}

/// Drop a trailing comment, leaving `#` inside quotes alone
fn strip_comment(line: &str) -> &str {
    let mut quoted = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => quoted = !quoted,
            '#' if !quoted => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Split "key = value"
fn split_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

fn parse_number<T: core::str::FromStr>(value: &str) -> Result<T, ParseErrorKind> {
    strip_separators(value)
        .parse()
        .map_err(|_| ParseErrorKind::InvalidNumber)
}

fn parse_time(value: &str) -> Result<ClockTime, ParseErrorKind> {
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(ParseErrorKind::InvalidTime)?;
    ClockTime::parse(inner).map_err(|_| ParseErrorKind::InvalidTime)
}

/// Parse "[a, b, c, d]"
fn parse_pins(value: &str) -> Result<[u8; MOTOR_PINS], ParseErrorKind> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or(ParseErrorKind::InvalidPins)?;

    let mut pins: Vec<u8, MOTOR_PINS> = Vec::new();
    for item in inner.split(',').map(str::trim) {
        // Trailing comma
        if item.is_empty() {
            continue;
        }
        let pin = item.parse().map_err(|_| ParseErrorKind::InvalidPins)?;
        pins.push(pin).map_err(|_| ParseErrorKind::InvalidPins)?;
    }

    pins.into_array().map_err(|_| ParseErrorKind::InvalidPins)
}

/// Remove `_` digit separators, which `str::parse` does not accept
///
/// Input too long for the buffer comes back empty and fails the parse.
fn strip_separators(value: &str) -> heapless::String<24> {
    let mut out = heapless::String::new();
    for c in value.chars().filter(|&c| c != '_') {
        if out.push(c).is_err() {
            out.clear();
            break;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# Clock hand on a 28BYJ-48
[motor]
pins = [2, 3, 4, 5]
steps_per_rev = 4_096   # half-stepping
min_interval_us = 150

[clock]
tick_rpm = 5
adjust_rpm = 12.5
check_interval_ms = 500
hand_time = "03:00"
start_time = "09:41:07"
watchdog_timeout_ms = 0
"#;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.motor.pins, [2, 3, 4, 5]);
        assert_eq!(config.motor.steps_per_rev, 4096);
        assert_eq!(config.motor.min_interval_us, 150);
        assert_eq!(config.clock.tick_rpm, 5.0);
        assert_eq!(config.clock.adjust_rpm, 12.5);
        assert_eq!(config.clock.check_interval_ms, 500);
        assert_eq!(config.clock.hand_time, ClockTime::hm(3, 0).unwrap());
        assert_eq!(config.clock.start_time, ClockTime::new(9, 41, 7).unwrap());
        assert_eq!(config.clock.watchdog_timeout_ms, 0);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_missing_keys_keep_defaults() {
        let config = parse_config("[clock]\ntick_rpm = 3.0\n").unwrap();
        let defaults = ClockConfig::default();
        assert_eq!(config.clock.tick_rpm, 3.0);
        assert_eq!(config.motor, defaults.motor);
        assert_eq!(config.clock.adjust_rpm, defaults.clock.adjust_rpm);
        assert_eq!(parse_config("").unwrap(), defaults);
    }

    #[test]
    fn test_errors_carry_line_numbers() {
        let err = parse_config("[motor]\n\nsteps_per_rev = lots\n").unwrap_err();
        assert_eq!(
            err,
            ParseError {
                kind: ParseErrorKind::InvalidNumber,
                line: 3
            }
        );

        let err = parse_config("[display]\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownSection);
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_unknown_and_misplaced_keys() {
        let err = parse_config("[motor]\ntick_rpm = 6.0\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownKey);

        let err = parse_config("steps_per_rev = 4096\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::UnknownKey);

        let err = parse_config("[clock]\njust words\n").unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::Syntax);
    }

    #[test]
    fn test_parse_pins() {
        assert_eq!(parse_pins("[0, 1, 2, 3]"), Ok([0, 1, 2, 3]));
        assert_eq!(parse_pins("[10,11,12,13,]"), Ok([10, 11, 12, 13]));
        assert_eq!(parse_pins("[1, 2, 3]"), Err(ParseErrorKind::InvalidPins));
        assert_eq!(parse_pins("[1, 2, 3, 4, 5]"), Err(ParseErrorKind::InvalidPins));
        assert_eq!(parse_pins("1, 2, 3, 4"), Err(ParseErrorKind::InvalidPins));
        assert_eq!(parse_pins("[1, x, 3, 4]"), Err(ParseErrorKind::InvalidPins));
    }

    #[test]
    fn test_parse_time_needs_quotes() {
        assert_eq!(parse_time("\"07:30\""), Ok(ClockTime::hm(7, 30).unwrap()));
        assert_eq!(parse_time("07:30"), Err(ParseErrorKind::InvalidTime));
        assert_eq!(parse_time("\"25:00\""), Err(ParseErrorKind::InvalidTime));
    }

    #[test]
    fn test_strip_comment_respects_quotes() {
        assert_eq!(strip_comment("a = 1 # note"), "a = 1 ");
        assert_eq!(strip_comment("a = \"#1\""), "a = \"#1\"");
    }
}
