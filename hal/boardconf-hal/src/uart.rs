//! UART descriptor and line settings

use crate::clock::{Bus, ClockGate};
use crate::error::DescriptorError;
use crate::gpio::{AltFunction, Pin};
use crate::irq::Vector;
use crate::Instance;

/// One UART/USART instance and its wiring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(C)]
pub struct UartDescriptor {
    pub instance: Instance,
    /// Enable mask on the owning bus
    pub clock: ClockGate,
    pub rx: Pin,
    pub tx: Pin,
    pub rx_af: AltFunction,
    pub tx_af: AltFunction,
    pub vector: Vector,
}

impl UartDescriptor {
    /// Bus the instance is clocked from
    pub const fn bus(&self) -> Bus {
        self.clock.bus
    }

    /// Check chip-independent invariants
    pub const fn validate(&self) -> Result<(), DescriptorError> {
        if let Err(e) = self.clock.validate_peripheral() {
            return Err(e);
        }
        if let Err(e) = self.rx.validate() {
            return Err(e);
        }
        if let Err(e) = self.tx.validate() {
            return Err(e);
        }
        if self.rx.same_as(&self.tx) {
            return Err(DescriptorError::PinAlias);
        }
        Ok(())
    }
}

/// UART line configuration
#[derive(Debug, Clone, Copy)]
pub struct UartConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            baudrate: 115200,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

/// Number of data bits per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBits {
    Seven,
    Eight,
    Nine,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

/// Baud-rate register value for 16x oversampling
///
/// Rounds to the nearest divider. Returns `None` when the requested rate
/// cannot be generated from `bus_clock` (divider below 16 or above 16 bits).
pub const fn brr(bus_clock: u32, baudrate: u32) -> Option<u16> {
    if baudrate == 0 {
        return None;
    }
    let baudrate = baudrate as u64;
    let div = (bus_clock as u64 + baudrate / 2) / baudrate;
    if div < 16 || div > u16::MAX as u64 {
        None
    } else {
        Some(div as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::Port;

    fn usart3() -> UartDescriptor {
        UartDescriptor {
            instance: Instance::new("USART3", 0x4000_4800),
            clock: ClockGate::apb1(1 << 18),
            rx: Pin::new(Port::C, 11),
            tx: Pin::new(Port::C, 10),
            rx_af: AltFunction::AF7,
            tx_af: AltFunction::AF7,
            vector: Vector(39),
        }
    }

    #[test]
    fn test_valid_descriptor() {
        assert_eq!(usart3().validate(), Ok(()));
        assert_eq!(usart3().bus(), Bus::Apb1);
    }

    #[test]
    fn test_rx_tx_alias_rejected() {
        let uart = UartDescriptor {
            tx: Pin::new(Port::C, 11),
            ..usart3()
        };
        assert_eq!(uart.validate(), Err(DescriptorError::PinAlias));
    }

    #[test]
    fn test_brr() {
        // 32 MHz / 115200 = 277.7 -> 278
        assert_eq!(brr(32_000_000, 115_200), Some(278));
        assert_eq!(brr(32_000_000, 9_600), Some(3333));
        assert_eq!(brr(32_000_000, 0), None);
        assert_eq!(brr(1_000_000, 115_200), None);
    }

    #[test]
    fn test_brr_near_u32_limit() {
        // 4294967295 / 115200 = 37282.7 -> 37283
        assert_eq!(brr(u32::MAX, 115_200), Some(37283));
        assert_eq!(brr(u32::MAX, u32::MAX), None);
        assert_eq!(brr(u32::MAX, 1), None);
    }

    #[test]
    fn test_default_config() {
        let config = UartConfig::default();
        assert_eq!(config.baudrate, 115200);
        assert_eq!(config.data_bits, DataBits::Eight);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.stop_bits, StopBits::One);
    }
}
