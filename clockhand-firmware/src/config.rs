//! Configuration loading
//!
//! `clock.toml` is compiled into the image. It is parsed and validated at
//! boot; on any error the built-in defaults are used instead.

use defmt::*;

use clockhand_core::config::{parse_config, ClockConfig};

/// Embedded configuration (compiled into firmware)
/// Edit clock.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../clock.toml");

/// Load the embedded configuration, falling back to defaults
pub fn load() -> ClockConfig {
    let config = match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => config,
        Err(e) => {
            error!("clock.toml line {}: {}", e.line, e.kind);
            warn!("Using default configuration");
            return ClockConfig::default();
        }
    };

    match config.validate() {
        Ok(()) => {
            info!("Parsed embedded configuration successfully");
            config
        }
        Err(e) => {
            error!("clock.toml rejected: {}", e);
            warn!("Using default configuration");
            ClockConfig::default()
        }
    }
}
