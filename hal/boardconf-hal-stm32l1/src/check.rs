//! Chip legality checks
//!
//! The core tables only know chip-independent rules. These checks add
//! what the STM32L1 says: the instance exists and is of the right class,
//! its clock gate and vectors are the real ones, and every pin can carry
//! its signal on the declared alternate function.
//!
//! Boards run them in `const _` items next to their tables:
//!
//! ```ignore
//! const _: () = check::assert_uarts(UARTS.as_slice());
//! ```

use boardconf_core::{Board, ConfigError, PeripheralClass};
use boardconf_hal::{
    AltFunction, DescriptorError, I2cDescriptor, Pin, SpiDescriptor, TimerDescriptor,
    UartDescriptor,
};

use crate::af::{af_for, Signal};
use crate::map::{self, InstanceInfo, Kind};

const fn info(base: u32, kind: Kind) -> Result<InstanceInfo, DescriptorError> {
    match map::lookup(base) {
        Some(info) if info.kind as u8 == kind as u8 => Ok(info),
        _ => Err(DescriptorError::UnknownInstance),
    }
}

const fn routed(base: u32, signal: Signal, pin: Pin, af: AltFunction) -> Result<(), DescriptorError> {
    match af_for(base, signal, pin) {
        Some(real) if real.bits() == af.bits() => Ok(()),
        _ => Err(DescriptorError::AltFunctionUnavailable),
    }
}

/// Check a timer descriptor against the chip
pub const fn timer(d: &TimerDescriptor) -> Result<(), DescriptorError> {
    let info = match info(d.instance.base, Kind::Timer) {
        Ok(info) => info,
        Err(e) => return Err(e),
    };
    if !d.clock.same_as(&info.clock) {
        return Err(DescriptorError::ClockMismatch);
    }
    if !d.vector.same_as(info.vector) {
        return Err(DescriptorError::VectorMismatch);
    }
    Ok(())
}

/// Check a UART descriptor against the chip
pub const fn uart(d: &UartDescriptor) -> Result<(), DescriptorError> {
    let base = d.instance.base;
    let info = match info(base, Kind::Usart) {
        Ok(info) => info,
        Err(e) => return Err(e),
    };
    if !d.clock.same_as(&info.clock) {
        return Err(DescriptorError::ClockMismatch);
    }
    if !d.vector.same_as(info.vector) {
        return Err(DescriptorError::VectorMismatch);
    }
    if let Err(e) = routed(base, Signal::Rx, d.rx, d.rx_af) {
        return Err(e);
    }
    routed(base, Signal::Tx, d.tx, d.tx_af)
}

/// Check a SPI descriptor against the chip
pub const fn spi(d: &SpiDescriptor) -> Result<(), DescriptorError> {
    let base = d.instance.base;
    let info = match info(base, Kind::Spi) {
        Ok(info) => info,
        Err(e) => return Err(e),
    };
    if !d.clock.same_as(&info.clock) {
        return Err(DescriptorError::ClockMismatch);
    }
    if !d.vector.same_as(info.vector) {
        return Err(DescriptorError::VectorMismatch);
    }
    if !d.port_clock.same_as(&map::port_gate(d.port)) {
        return Err(DescriptorError::PortClockMismatch);
    }
    if let Err(e) = routed(base, Signal::Sck, d.sck(), d.af) {
        return Err(e);
    }
    if let Err(e) = routed(base, Signal::Mosi, d.mosi(), d.af) {
        return Err(e);
    }
    routed(base, Signal::Miso, d.miso(), d.af)
}

/// Check an I2C descriptor against the chip
pub const fn i2c(d: &I2cDescriptor) -> Result<(), DescriptorError> {
    let base = d.instance.base;
    let info = match info(base, Kind::I2c) {
        Ok(info) => info,
        Err(e) => return Err(e),
    };
    if !d.clock.same_as(&info.clock) {
        return Err(DescriptorError::ClockMismatch);
    }
    if !d.event_vector.same_as(info.vector) {
        return Err(DescriptorError::VectorMismatch);
    }
    match info.error_vector {
        Some(er) if er.same_as(d.error_vector) => {}
        _ => return Err(DescriptorError::VectorMismatch),
    }
    if let Err(e) = routed(base, Signal::Scl, d.scl, d.af) {
        return Err(e);
    }
    routed(base, Signal::Sda, d.sda, d.af)
}

macro_rules! table_checks {
    ($($check:ident, $assert:ident, $one:ident, $desc:ty, $class:ident;)+) => {
        $(
            #[doc = concat!("Check every ", stringify!($one), " descriptor of a table")]
            pub const fn $check(entries: &[$desc]) -> Result<(), ConfigError> {
                let mut i = 0;
                while i < entries.len() {
                    if let Err(e) = $one(&entries[i]) {
                        return Err(ConfigError::descriptor(PeripheralClass::$class, i, e));
                    }
                    i += 1;
                }
                Ok(())
            }

            #[doc = concat!("Fail const evaluation unless [`", stringify!($check), "`] passes")]
            pub const fn $assert(entries: &[$desc]) {
                if let Err(e) = $check(entries) {
                    e.raise()
                }
            }
        )+
    };
}

table_checks! {
    timers, assert_timers, timer, TimerDescriptor, Timer;
    uarts, assert_uarts, uart, UartDescriptor, Uart;
    spis, assert_spis, spi, SpiDescriptor, Spi;
    i2cs, assert_i2cs, i2c, I2cDescriptor, I2c;
}

/// Check a whole board against the chip
pub fn board(board: &Board) -> Result<(), ConfigError> {
    timers(board.timers)?;
    uarts(board.uarts)?;
    spis(board.spis)?;
    i2cs(board.i2cs)
}
