//! Build script for clockhand-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates clock.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

const MOTOR_KEYS: &[&str] = &["pins", "steps_per_rev", "min_interval_us"];
const CLOCK_KEYS: &[&str] = &[
    "tick_rpm",
    "adjust_rpm",
    "check_interval_ms",
    "hand_time",
    "start_time",
    "watchdog_timeout_ms",
];

/// Highest RP2040 GPIO
const MAX_GPIO: i64 = 29;

/// Longest RP2040 watchdog period
const WATCHDOG_MAX_MS: i64 = 8388;

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate clock.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=clock.toml");

    let config_path = Path::new("clock.toml");
    if !config_path.exists() {
        fail("clock.toml not found", &["The firmware embeds clock.toml from the crate root."]);
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read clock.toml", &[&e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => {
            let msg = e.to_string();
            let lines: Vec<&str> = msg.lines().collect();
            fail("Invalid TOML syntax in clock.toml", &lines);
        }
    };

    let mut errors = Vec::new();
    check_sections(&config, &mut errors);
    if let Some(motor) = config.get("motor").and_then(|m| m.as_table()) {
        check_keys("motor", motor, MOTOR_KEYS, &mut errors);
        check_motor(motor, &mut errors);
    }
    if let Some(clock) = config.get("clock").and_then(|c| c.as_table()) {
        check_keys("clock", clock, CLOCK_KEYS, &mut errors);
        check_clock(clock, &mut errors);
    }

    if errors.is_empty() {
        check_watchdog_budget(&config, &mut errors);
    }

    if !errors.is_empty() {
        let lines: Vec<&str> = errors.iter().map(String::as_str).collect();
        fail("Invalid configuration in clock.toml", &lines);
    }

    println!("cargo:warning=clock.toml validated successfully");
}

/// Abort the build with a boxed message
fn fail(title: &str, lines: &[&str]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        format_error_lines(lines)
    );
}

/// Format error message lines with box drawing
fn format_error_lines(lines: &[&str]) -> String {
    lines
        .iter()
        .map(|line| {
            let truncated = if line.len() > 62 {
                format!("{}...", &line[..59])
            } else {
                line.to_string()
            };
            format!("║  • {:<62} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn check_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        errors.push("Top level must be a table".into());
        return;
    };
    for (name, value) in root {
        match name.as_str() {
            "motor" | "clock" if value.is_table() => {}
            "motor" | "clock" => errors.push(format!("[{}] must be a table", name)),
            _ => errors.push(format!("Unknown section [{}]", name)),
        }
    }
    for required in ["motor", "clock"] {
        if root.get(required).is_none() {
            errors.push(format!("Missing [{}] section", required));
        }
    }
}

fn check_keys(section: &str, table: &toml::Table, known: &[&str], errors: &mut Vec<String>) {
    for key in table.keys() {
        if !known.contains(&key.as_str()) {
            errors.push(format!("[{}] unknown key '{}'", section, key));
        }
    }
}

fn check_motor(motor: &toml::Table, errors: &mut Vec<String>) {
    match motor.get("pins") {
        Some(toml::Value::Array(pins)) => {
            if pins.len() != 4 {
                errors.push("[motor] pins must list exactly 4 GPIOs".into());
            }
            let mut seen = Vec::new();
            for pin in pins {
                match pin.as_integer() {
                    Some(n) if (0..=MAX_GPIO).contains(&n) => {
                        if seen.contains(&n) {
                            errors.push(format!("[motor] pin {} used twice", n));
                        }
                        seen.push(n);
                    }
                    _ => errors.push(format!("[motor] pins must be integers 0-{}", MAX_GPIO)),
                }
            }
        }
        Some(_) => errors.push("[motor] pins must be an array".into()),
        None => {}
    }

    for key in ["steps_per_rev", "min_interval_us"] {
        if let Some(value) = motor.get(key) {
            match value.as_integer() {
                Some(n) if n > 0 && n <= i64::from(u32::MAX) => {}
                _ => errors.push(format!("[motor] {} must be a positive integer", key)),
            }
        }
    }
}

fn check_clock(clock: &toml::Table, errors: &mut Vec<String>) {
    for key in ["tick_rpm", "adjust_rpm"] {
        if let Some(value) = clock.get(key) {
            let rpm = value.as_float().or_else(|| value.as_integer().map(|i| i as f64));
            match rpm {
                Some(r) if r > 0.0 && r.is_finite() => {}
                _ => errors.push(format!("[clock] {} must be a positive number", key)),
            }
        }
    }

    for key in ["hand_time", "start_time"] {
        if let Some(value) = clock.get(key) {
            match value.as_str() {
                Some(t) if valid_time(t) => {}
                _ => errors.push(format!("[clock] {} must be \"HH:MM\" or \"HH:MM:SS\"", key)),
            }
        }
    }

    let check_ms = match clock.get("check_interval_ms") {
        Some(value) => match value.as_integer() {
            Some(n) if n > 0 => n,
            _ => {
                errors.push("[clock] check_interval_ms must be a positive integer".into());
                return;
            }
        },
        None => 1000,
    };

    if let Some(value) = clock.get("watchdog_timeout_ms") {
        match value.as_integer() {
            Some(0) => {}
            Some(n) if n > WATCHDOG_MAX_MS => errors.push(format!(
                "[clock] watchdog_timeout_ms must be at most {}",
                WATCHDOG_MAX_MS
            )),
            Some(n) if n > check_ms => {}
            _ => errors.push(
                "[clock] watchdog_timeout_ms must be 0 or exceed check_interval_ms".into(),
            ),
        }
    }
}

/// The watchdog is not fed while a move runs, so the longest move (half a
/// revolution at the slower rate) plus one clock check must fit inside it
fn check_watchdog_budget(config: &toml::Value, errors: &mut Vec<String>) {
    let int = |section: &str, key: &str, default: i64| {
        config
            .get(section)
            .and_then(|s| s.get(key))
            .and_then(toml::Value::as_integer)
            .unwrap_or(default)
    };
    let rpm = |key: &str, default: f64| {
        config
            .get("clock")
            .and_then(|s| s.get(key))
            .and_then(|v| v.as_float().or_else(|| v.as_integer().map(|i| i as f64)))
            .unwrap_or(default)
    };

    let watchdog_ms = int("clock", "watchdog_timeout_ms", 8000);
    if watchdog_ms == 0 {
        return;
    }
    let steps_per_rev = int("motor", "steps_per_rev", 4096);
    let min_interval_us = int("motor", "min_interval_us", 100);
    let check_ms = int("clock", "check_interval_ms", 1000);
    let slowest_rpm = rpm("tick_rpm", 6.0).min(rpm("adjust_rpm", 10.0));

    let interval_us = ((60_000_000.0 / (slowest_rpm * steps_per_rev as f64)) as i64)
        .max(1)
        .max(min_interval_us);
    let move_us = (steps_per_rev / 2) * interval_us;
    if move_us + check_ms * 1000 >= watchdog_ms * 1000 {
        errors.push(format!(
            "[clock] watchdog {} ms < half turn {} ms + check",
            watchdog_ms,
            move_us / 1000
        ));
    }
}

/// "HH:MM" or "HH:MM:SS" with hour < 24
fn valid_time(text: &str) -> bool {
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return false;
    }
    let limits = [23u32, 59, 59];
    parts.iter().zip(limits).all(|(part, max)| {
        !part.is_empty()
            && part.len() <= 2
            && part.parse::<u32>().map(|v| v <= max).unwrap_or(false)
    })
}
