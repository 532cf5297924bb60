//! Interrupt bindings
//!
//! Each slot of a table gets one entry function. Entry functions route to
//! the sink installed with [`boardconf_core::dispatch::install`].
//! [`VECTORS`] places them by vector number for the firmware image, and
//! [`DISPATCH`] serves the shared default handler.

use boardconf_core::validate::{validate_bindings, MAX_REPORTED};
use boardconf_core::{bind_isrs, ConfigError, Dispatcher, VectorTable};
use boardconf_hal_stm32l1::IRQ_COUNT;
use heapless::Vec;

use crate::periph::{I2CS, SPIS, TIMERS, UARTS};

bind_isrs! {
    pub const TIMER_ISRS: Timer for TIMERS => {
        0 => isr_tim5,
    }
}

bind_isrs! {
    pub const UART_ISRS: Uart for UARTS => {
        0 => isr_usart3,
        1 => isr_usart1,
    }
}

bind_isrs! {
    pub const SPI_ISRS: Spi for SPIS => {
        0 => isr_spi1,
        1 => isr_spi3,
    }
}

bind_isrs! {
    pub const I2C_EVENT_ISRS: I2cEvent for I2CS => {
        0 => isr_i2c1_ev,
        1 => isr_i2c2_ev,
    }
}

bind_isrs! {
    pub const I2C_ERROR_ISRS: I2cError for I2CS => {
        0 => isr_i2c1_er,
        1 => isr_i2c2_er,
    }
}

const _: () = I2C_EVENT_ISRS.assert_disjoint(&I2C_ERROR_ISRS);

/// Entry function per vector
pub const VECTORS: VectorTable<IRQ_COUNT> = VectorTable::new()
    .timers(TIMERS.as_slice(), &TIMER_ISRS)
    .uarts(UARTS.as_slice(), &UART_ISRS)
    .spis(SPIS.as_slice(), &SPI_ISRS)
    .i2cs(I2CS.as_slice(), &I2C_EVENT_ISRS, &I2C_ERROR_ISRS);

/// Check every entry function serves exactly one slot, by address
pub fn check_bindings() -> Result<(), Vec<ConfigError, MAX_REPORTED>> {
    validate_bindings(
        crate::NAME,
        &[
            (TIMER_ISRS.line(), TIMER_ISRS.entries()),
            (UART_ISRS.line(), UART_ISRS.entries()),
            (SPI_ISRS.line(), SPI_ISRS.entries()),
            (I2C_EVENT_ISRS.line(), I2C_EVENT_ISRS.entries()),
            (I2C_ERROR_ISRS.line(), I2C_ERROR_ISRS.entries()),
        ],
    )
}

/// Route per vector
pub const DISPATCH: Dispatcher<IRQ_COUNT> = Dispatcher::new()
    .timers(TIMERS.as_slice())
    .uarts(UARTS.as_slice())
    .spis(SPIS.as_slice())
    .i2cs(I2CS.as_slice());
