//! Dynamic pin allocation for config-driven hardware setup
//!
//! GPIO numbers come from `clock.toml`, so pins are handed out by number
//! at runtime instead of being named in code.

use embassy_rp::gpio::AnyPin;
use embassy_rp::peripherals::WATCHDOG;
use embassy_rp::{Peri, Peripherals};

/// Number of user GPIOs on the RP2040
pub const GPIO_COUNT: usize = 30;

/// Error when requesting a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin number out of range (0-29 valid)
    InvalidPin(u8),
    /// Pin already taken
    AlreadyTaken(u8),
}

macro_rules! any_pins {
    ($p:ident; $($pin:ident),* $(,)?) => {
        [$(Some(Peri::<'static, AnyPin>::from($p.$pin))),*]
    };
}

/// Pin bank that holds all GPIO pins and allows taking them by number
pub struct PinBank {
    pins: [Option<Peri<'static, AnyPin>>; GPIO_COUNT],
}

/// Non-GPIO peripherals the firmware still needs
pub struct BoardPeripherals {
    pub watchdog: Peri<'static, WATCHDOG>,
}

impl PinBank {
    /// Split the peripherals into a pin bank and the rest
    pub fn from_peripherals(p: Peripherals) -> (Self, BoardPeripherals) {
        let pins = any_pins!(p;
            PIN_0, PIN_1, PIN_2, PIN_3, PIN_4, PIN_5, PIN_6, PIN_7, PIN_8, PIN_9,
            PIN_10, PIN_11, PIN_12, PIN_13, PIN_14, PIN_15, PIN_16, PIN_17, PIN_18, PIN_19,
            PIN_20, PIN_21, PIN_22, PIN_23, PIN_24, PIN_25, PIN_26, PIN_27, PIN_28, PIN_29,
        );
        let board = BoardPeripherals {
            watchdog: p.WATCHDOG,
        };
        (Self { pins }, board)
    }

    /// Take a pin by number
    pub fn take(&mut self, pin_num: u8) -> Result<Peri<'static, AnyPin>, PinError> {
        self.pins
            .get_mut(usize::from(pin_num))
            .ok_or(PinError::InvalidPin(pin_num))?
            .take()
            .ok_or(PinError::AlreadyTaken(pin_num))
    }
}
