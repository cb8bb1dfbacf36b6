//! Configuration types
//!
//! Board-agnostic configuration, embedded in the firmware as `clock.toml`
//! and read at boot with [`parse_config`].

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError, ParseErrorKind};
pub use types::*;
