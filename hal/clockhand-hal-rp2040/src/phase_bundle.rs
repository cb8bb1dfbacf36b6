//! Coil line bundle
//!
//! The four coil lines are plain SIO outputs. A phase code is applied with
//! a single write to the SIO `GPIO_OUT_XOR` register, so all four lines
//! change on the same clock edge and other GPIOs are left untouched.

use embassy_rp::gpio::{AnyPin, Level, Output, Pin};
use embassy_rp::{pac, Peri};

use clockhand_core::config::MOTOR_PINS;
use clockhand_core::motion::PHASE_OFF;
use clockhand_core::traits::PhaseOutput;

use crate::pins::{PinBank, PinError};

/// Four GPIO outputs written as one value
pub struct PhaseBundle<'d> {
    /// Held to keep the pins configured as SIO outputs
    _lines: [Output<'d>; MOTOR_PINS],
    /// GPIO bit for each coil line
    bits: [u32; MOTOR_PINS],
    mask: u32,
}

impl<'d> PhaseBundle<'d> {
    /// Configure four pins as outputs, all low
    ///
    /// Line `i` of a phase code drives `pins[i]`.
    pub fn new(pins: [Peri<'d, AnyPin>; MOTOR_PINS]) -> Self {
        let bits = [
            1u32 << pins[0].pin(),
            1u32 << pins[1].pin(),
            1u32 << pins[2].pin(),
            1u32 << pins[3].pin(),
        ];
        let mask = bits.iter().fold(0, |acc, bit| acc | bit);
        let lines = pins.map(|pin| Output::new(pin, Level::Low));

        let mut bundle = Self {
            _lines: lines,
            bits,
            mask,
        };
        bundle.write_phase(PHASE_OFF);
        bundle
    }

    /// GPIO levels for a phase code
    fn levels(&self, code: u8) -> u32 {
        self.bits
            .iter()
            .enumerate()
            .filter(|(i, _)| code & (1 << i) != 0)
            .fold(0, |acc, (_, bit)| acc | bit)
    }
}

impl PhaseBundle<'static> {
    /// Take the configured pins from the bank
    pub fn from_bank(bank: &mut PinBank, pins: [u8; MOTOR_PINS]) -> Result<Self, PinError> {
        let lines = [
            bank.take(pins[0])?,
            bank.take(pins[1])?,
            bank.take(pins[2])?,
            bank.take(pins[3])?,
        ];
        Ok(Self::new(lines))
    }
}

impl PhaseOutput for PhaseBundle<'_> {
    fn write_phase(&mut self, code: u8) {
        let out = pac::SIO.gpio_out(0);
        let current = out.value().read();
        let flip = (current ^ self.levels(code)) & self.mask;
        out.value_xor().write_value(flip);
    }
}
