//! Alternate-function map
//!
//! Which pins can carry which peripheral signal, and on which AF number.
//! Only the signals the descriptor schema routes are listed.

use boardconf_hal::{AltFunction, Pin, Port};

use crate::map;

use AltFunction as Af;
use Port::{A, B, C, D, E};
use Signal::{Miso, Mosi, Rx, Sck, Scl, Sda, Tx};

/// A peripheral signal routed through the pin mux
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Signal {
    Tx,
    Rx,
    Sck,
    Mosi,
    Miso,
    Scl,
    Sda,
}

/// One row of the AF map
#[derive(Debug, Clone, Copy)]
pub struct Route {
    /// Instance register base
    pub base: u32,
    pub signal: Signal,
    pub pin: Pin,
    pub af: AltFunction,
}

const fn r(base: u32, signal: Signal, port: Port, number: u8, af: AltFunction) -> Route {
    Route {
        base,
        signal,
        pin: Pin::new(port, number),
        af,
    }
}

const USART1: u32 = map::USART1.instance.base;
const USART2: u32 = map::USART2.instance.base;
const USART3: u32 = map::USART3.instance.base;
const UART4: u32 = map::UART4.instance.base;
const UART5: u32 = map::UART5.instance.base;
const SPI1: u32 = map::SPI1.instance.base;
const SPI2: u32 = map::SPI2.instance.base;
const SPI3: u32 = map::SPI3.instance.base;
const I2C1: u32 = map::I2C1.instance.base;
const I2C2: u32 = map::I2C2.instance.base;

/// Every routable signal
pub const ROUTES: [Route; 47] = [
    // USART1
    r(USART1, Tx, A, 9, Af::AF7),
    r(USART1, Rx, A, 10, Af::AF7),
    r(USART1, Tx, B, 6, Af::AF7),
    r(USART1, Rx, B, 7, Af::AF7),
    // USART2
    r(USART2, Tx, A, 2, Af::AF7),
    r(USART2, Rx, A, 3, Af::AF7),
    r(USART2, Tx, D, 5, Af::AF7),
    r(USART2, Rx, D, 6, Af::AF7),
    // USART3
    r(USART3, Tx, B, 10, Af::AF7),
    r(USART3, Rx, B, 11, Af::AF7),
    r(USART3, Tx, C, 10, Af::AF7),
    r(USART3, Rx, C, 11, Af::AF7),
    r(USART3, Tx, D, 8, Af::AF7),
    r(USART3, Rx, D, 9, Af::AF7),
    // UART4, UART5
    r(UART4, Tx, C, 10, Af::AF8),
    r(UART4, Rx, C, 11, Af::AF8),
    r(UART5, Tx, C, 12, Af::AF8),
    r(UART5, Rx, D, 2, Af::AF8),
    // SPI1
    r(SPI1, Sck, A, 5, Af::AF5),
    r(SPI1, Miso, A, 6, Af::AF5),
    r(SPI1, Mosi, A, 7, Af::AF5),
    r(SPI1, Miso, A, 11, Af::AF5),
    r(SPI1, Mosi, A, 12, Af::AF5),
    r(SPI1, Sck, B, 3, Af::AF5),
    r(SPI1, Miso, B, 4, Af::AF5),
    r(SPI1, Mosi, B, 5, Af::AF5),
    r(SPI1, Sck, E, 13, Af::AF5),
    r(SPI1, Miso, E, 14, Af::AF5),
    r(SPI1, Mosi, E, 15, Af::AF5),
    // SPI2
    r(SPI2, Sck, B, 13, Af::AF5),
    r(SPI2, Miso, B, 14, Af::AF5),
    r(SPI2, Mosi, B, 15, Af::AF5),
    r(SPI2, Sck, D, 1, Af::AF5),
    r(SPI2, Miso, D, 3, Af::AF5),
    r(SPI2, Mosi, D, 4, Af::AF5),
    // SPI3
    r(SPI3, Sck, B, 3, Af::AF6),
    r(SPI3, Miso, B, 4, Af::AF6),
    r(SPI3, Mosi, B, 5, Af::AF6),
    r(SPI3, Sck, C, 10, Af::AF6),
    r(SPI3, Miso, C, 11, Af::AF6),
    r(SPI3, Mosi, C, 12, Af::AF6),
    // I2C1
    r(I2C1, Scl, B, 6, Af::AF4),
    r(I2C1, Sda, B, 7, Af::AF4),
    r(I2C1, Scl, B, 8, Af::AF4),
    r(I2C1, Sda, B, 9, Af::AF4),
    // I2C2
    r(I2C2, Scl, B, 10, Af::AF4),
    r(I2C2, Sda, B, 11, Af::AF4),
];

/// Alternate function that routes `signal` of the instance at `base` to `pin`
pub const fn af_for(base: u32, signal: Signal, pin: Pin) -> Option<AltFunction> {
    let mut i = 0;
    while i < ROUTES.len() {
        let route = &ROUTES[i];
        if route.base == base && signal_eq(route.signal, signal) && route.pin.same_as(&pin) {
            return Some(route.af);
        }
        i += 1;
    }
    None
}

const fn signal_eq(a: Signal, b: Signal) -> bool {
    a as u8 == b as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usart3_on_port_c() {
        assert_eq!(
            af_for(USART3, Tx, Pin::new(C, 10)),
            Some(AltFunction::AF7)
        );
        assert_eq!(
            af_for(USART3, Rx, Pin::new(C, 11)),
            Some(AltFunction::AF7)
        );
    }

    #[test]
    fn test_shared_pins_differ_by_instance() {
        assert_eq!(af_for(SPI1, Sck, Pin::new(B, 3)), Some(AltFunction::AF5));
        assert_eq!(af_for(SPI3, Sck, Pin::new(B, 3)), Some(AltFunction::AF6));
        assert_eq!(af_for(UART4, Tx, Pin::new(C, 10)), Some(AltFunction::AF8));
    }

    #[test]
    fn test_wrong_signal_or_pin() {
        assert_eq!(af_for(USART1, Rx, Pin::new(A, 9)), None);
        assert_eq!(af_for(I2C1, Scl, Pin::new(B, 10)), None);
        assert_eq!(af_for(I2C2, Sda, Pin::new(B, 11)), Some(AltFunction::AF4));
    }
}
