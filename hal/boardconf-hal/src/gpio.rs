//! GPIO pin abstractions
//!
//! Pins are `{port, number}` pairs rather than raw integers so a UART pin
//! can never be mistaken for a SPI pin number on another port.

use crate::clock::ClockGate;
use crate::error::{DescriptorError, HalError};

/// Number of pins per GPIO port
pub const PINS_PER_PORT: u8 = 16;

/// GPIO port
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u8)]
pub enum Port {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

impl Port {
    /// All ports in index order
    pub const ALL: [Port; 8] = [
        Port::A,
        Port::B,
        Port::C,
        Port::D,
        Port::E,
        Port::F,
        Port::G,
        Port::H,
    ];

    /// Zero-based port index (A = 0)
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Port letter, for diagnostics
    pub const fn letter(self) -> char {
        match self {
            Port::A => 'A',
            Port::B => 'B',
            Port::C => 'C',
            Port::D => 'D',
            Port::E => 'E',
            Port::F => 'F',
            Port::G => 'G',
            Port::H => 'H',
        }
    }
}

/// A GPIO pin: port plus pin number
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(C)]
pub struct Pin {
    pub port: Port,
    pub number: u8,
}

impl Pin {
    /// Create a pin
    ///
    /// Panics if `number` is not a valid pin number. In a `const` item this
    /// is a compile error.
    pub const fn new(port: Port, number: u8) -> Self {
        match Self::try_new(port, number) {
            Ok(pin) => pin,
            Err(_) => panic!("pin number out of range"),
        }
    }

    /// Create a pin, rejecting out-of-range numbers
    pub const fn try_new(port: Port, number: u8) -> Result<Self, DescriptorError> {
        if number >= PINS_PER_PORT {
            return Err(DescriptorError::InvalidPinNumber);
        }
        Ok(Self { port, number })
    }

    /// Check the pin number is in range
    ///
    /// Only fails for pins built by struct literal, which bypasses [`Pin::new`].
    pub const fn validate(&self) -> Result<(), DescriptorError> {
        if self.number >= PINS_PER_PORT {
            Err(DescriptorError::InvalidPinNumber)
        } else {
            Ok(())
        }
    }

    /// Const equality (derive(PartialEq) is not usable in const fn)
    pub const fn same_as(&self, other: &Pin) -> bool {
        self.port as u8 == other.port as u8 && self.number == other.number
    }
}

/// Alternate function selector (AF0..AF15)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(transparent)]
pub struct AltFunction(u8);

impl AltFunction {
    pub const AF0: Self = Self(0);
    pub const AF1: Self = Self(1);
    pub const AF2: Self = Self(2);
    pub const AF3: Self = Self(3);
    pub const AF4: Self = Self(4);
    pub const AF5: Self = Self(5);
    pub const AF6: Self = Self(6);
    pub const AF7: Self = Self(7);
    pub const AF8: Self = Self(8);
    pub const AF9: Self = Self(9);
    pub const AF10: Self = Self(10);
    pub const AF11: Self = Self(11);
    pub const AF12: Self = Self(12);
    pub const AF13: Self = Self(13);
    pub const AF14: Self = Self(14);
    pub const AF15: Self = Self(15);

    /// Create a selector, rejecting values above 15
    pub const fn try_new(af: u8) -> Result<Self, DescriptorError> {
        if af > 15 {
            Err(DescriptorError::InvalidAltFunction)
        } else {
            Ok(Self(af))
        }
    }

    /// Raw selector value
    pub const fn bits(self) -> u8 {
        self.0
    }
}

/// Electrical mode of a pin routed to a peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u8)]
pub enum PinMode {
    /// Push-pull, no pull resistor
    PushPull,
    /// Push-pull with pull-up (idle-high inputs such as UART rx)
    PushPullPullUp,
    /// Open-drain, no pull resistor
    OpenDrain,
    /// Open-drain with pull-up (I2C)
    OpenDrainPullUp,
}

impl PinMode {
    /// Output driver is open-drain
    pub const fn is_open_drain(self) -> bool {
        matches!(self, PinMode::OpenDrain | PinMode::OpenDrainPullUp)
    }

    /// Internal pull-up is enabled
    pub const fn pull_up(self) -> bool {
        matches!(self, PinMode::PushPullPullUp | PinMode::OpenDrainPullUp)
    }
}

/// GPIO multiplexer
///
/// Routes pins to peripheral signals. Implementations assume the port
/// clock is already running; callers enable it first via
/// [`PinMux::port_gate`] and [`ClockControl`](crate::ClockControl).
pub trait PinMux {
    /// Clock gate feeding the given port
    fn port_gate(&self, port: Port) -> ClockGate;

    /// Switch a pin to alternate-function mode with the given selector
    fn configure_af(&mut self, pin: Pin, af: AltFunction, mode: PinMode) -> Result<(), HalError>;
}
