//! GPIO alternate-function routing for STM32L1

use boardconf_hal::{AltFunction, ClockControl, ClockGate, HalError, Pin, PinMode, PinMux, Port};

use crate::map;
use crate::mmio::Mmio;
use crate::Stm32l1;

// Register offsets
pub const MODER: u32 = 0x00;
pub const OTYPER: u32 = 0x04;
pub const OSPEEDR: u32 = 0x08;
pub const PUPDR: u32 = 0x0C;
pub const AFRL: u32 = 0x20;
pub const AFRH: u32 = 0x24;

const MODE_AF: u32 = 0b10;
const SPEED_HIGH: u32 = 0b10;
const PULL_UP: u32 = 0b01;
const PULL_NONE: u32 = 0b00;

impl<R: Mmio> PinMux for Stm32l1<R> {
    fn port_gate(&self, port: Port) -> ClockGate {
        map::port_gate(port)
    }

    /// Route a pin to an alternate function
    ///
    /// The port clock must already be on; the mode switch to AF is written
    /// last so the pin never drives with a half-written configuration.
    fn configure_af(&mut self, pin: Pin, af: AltFunction, mode: PinMode) -> Result<(), HalError> {
        pin.validate().map_err(|_| HalError::InvalidPin)?;
        if !self.is_enabled(map::port_gate(pin.port)) {
            return Err(HalError::ClockNotReady);
        }

        let base = map::gpio_base(pin.port);
        let n = u32::from(pin.number);
        let (afr, shift) = if n < 8 { (AFRL, n * 4) } else { (AFRH, (n - 8) * 4) };
        self.regs.write_field(base + afr, shift, 4, u32::from(af.bits()));
        self.regs
            .write_field(base + OTYPER, n, 1, u32::from(mode.is_open_drain()));
        self.regs.write_field(base + OSPEEDR, n * 2, 2, SPEED_HIGH);
        let pull = if mode.pull_up() { PULL_UP } else { PULL_NONE };
        self.regs.write_field(base + PUPDR, n * 2, 2, pull);
        self.regs.write_field(base + MODER, n * 2, 2, MODE_AF);
        Ok(())
    }
}
