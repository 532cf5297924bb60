//! LimiFrog v1 peripheral configuration
//!
//! The LimiFrog v1 carries an STM32L151RC. This crate is its peripheral
//! manifest: which timer, UART, SPI and I2C instances the board uses, how
//! they are clocked and wired, and which entry function serves each
//! interrupt.
//!
//! | Class | Index | Instance | Pins | Use |
//! |-------|-------|----------|------|-----|
//! | Timer | 0 | TIM5 | - | system timer |
//! | UART | 0 | USART3 | PC11 rx, PC10 tx | debug header |
//! | UART | 1 | USART1 | PA10 rx, PA9 tx | |
//! | SPI | 0 | SPI1 | PA5/PA7/PA6 | OLED display |
//! | SPI | 1 | SPI3 | PB3/PB5/PB4 | data flash |
//! | I2C | 0 | I2C1 | PB8 scl, PB9 sda | |
//! | I2C | 1 | I2C2 | PB10 scl, PB11 sda | |
//!
//! Every table is checked twice at compile time: once for the rules that
//! hold on any chip, once against the STM32L1 itself.

#![no_std]
#![deny(unsafe_code)]

pub mod clocks;
pub mod isr;
pub mod periph;

use boardconf_core::{Board, Priorities};
use boardconf_hal::Priority;

pub use isr::{DISPATCH, VECTORS};
pub use periph::{I2CS, SPIS, TIMERS, UARTS};

/// Board name used in diagnostics
pub const NAME: &str = "limifrog-v1";

/// Interrupt priorities
pub const PRIORITIES: Priorities = Priorities {
    i2c: Priority(1),
    ..Priorities::uniform(Priorities::DEFAULT)
};

static BOARD: Board = Board {
    name: NAME,
    clocks: clocks::BUS_CLOCKS,
    priorities: PRIORITIES,
    timers: TIMERS.as_slice(),
    uarts: UARTS.as_slice(),
    spis: SPIS.as_slice(),
    i2cs: I2CS.as_slice(),
};

/// The board configuration
pub fn board() -> &'static Board {
    &BOARD
}
