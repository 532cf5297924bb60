//! Peripheral classes and interrupt lines

use core::fmt;

/// Peripheral class a descriptor table holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PeripheralClass {
    Timer,
    Uart,
    Spi,
    I2c,
}

impl PeripheralClass {
    pub const fn as_str(self) -> &'static str {
        match self {
            PeripheralClass::Timer => "timer",
            PeripheralClass::Uart => "uart",
            PeripheralClass::Spi => "spi",
            PeripheralClass::I2c => "i2c",
        }
    }
}

impl fmt::Display for PeripheralClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An interrupt line of a peripheral class
///
/// Every class has one line per instance except I2C, which has separate
/// event and error lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Line {
    Timer,
    Uart,
    Spi,
    I2cEvent,
    I2cError,
}

impl Line {
    /// Class owning this line
    pub const fn class(self) -> PeripheralClass {
        match self {
            Line::Timer => PeripheralClass::Timer,
            Line::Uart => PeripheralClass::Uart,
            Line::Spi => PeripheralClass::Spi,
            Line::I2cEvent | Line::I2cError => PeripheralClass::I2c,
        }
    }

    pub const fn same_as(self, other: Line) -> bool {
        self as u8 == other as u8
    }
}
