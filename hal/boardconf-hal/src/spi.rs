//! SPI descriptor and bus settings

use crate::clock::ClockGate;
use crate::error::DescriptorError;
use crate::gpio::{AltFunction, Pin, Port};
use crate::irq::Vector;
use crate::Instance;

/// One SPI instance and its wiring
///
/// All three signal pins live on `port`; the descriptor stores bare pin
/// numbers plus the port so a cross-port wiring cannot be expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(C)]
pub struct SpiDescriptor {
    pub instance: Instance,
    /// Instance clock; enabled and disabled through `ClockControl`
    pub clock: ClockGate,
    pub vector: Vector,
    pub port: Port,
    /// Clock gate of `port`
    pub port_clock: ClockGate,
    pub sck: u8,
    pub mosi: u8,
    pub miso: u8,
    pub af: AltFunction,
}

impl SpiDescriptor {
    pub const fn sck(&self) -> Pin {
        Pin {
            port: self.port,
            number: self.sck,
        }
    }

    pub const fn mosi(&self) -> Pin {
        Pin {
            port: self.port,
            number: self.mosi,
        }
    }

    pub const fn miso(&self) -> Pin {
        Pin {
            port: self.port,
            number: self.miso,
        }
    }

    /// SCK, MOSI, MISO in configuration order
    pub const fn pins(&self) -> [Pin; 3] {
        [self.sck(), self.mosi(), self.miso()]
    }

    /// Check chip-independent invariants
    pub const fn validate(&self) -> Result<(), DescriptorError> {
        if let Err(e) = self.clock.validate_peripheral() {
            return Err(e);
        }
        if let Err(e) = self.port_clock.validate() {
            return Err(e);
        }
        let pins = self.pins();
        let mut i = 0;
        while i < pins.len() {
            if let Err(e) = pins[i].validate() {
                return Err(e);
            }
            i += 1;
        }
        if self.sck == self.mosi || self.sck == self.miso || self.mosi == self.miso {
            return Err(DescriptorError::PinAlias);
        }
        Ok(())
    }
}

/// SPI configuration
#[derive(Debug, Clone, Copy)]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Clock polarity
    pub polarity: Polarity,
    /// Clock phase
    pub phase: Phase,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            frequency: 1_000_000, // 1 MHz
            polarity: Polarity::IdleLow,
            phase: Phase::CaptureOnFirstTransition,
        }
    }
}

/// SPI clock polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    /// Clock idles low (CPOL=0)
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

/// SPI clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Data captured on first clock transition (CPHA=0)
    CaptureOnFirstTransition,
    /// Data captured on second clock transition (CPHA=1)
    CaptureOnSecondTransition,
}

/// Baud-rate prescaler: SCK = bus clock / 2^(bits + 1)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BaudPrescaler(u8);

impl BaudPrescaler {
    /// Fastest prescaler whose SCK does not exceed `target_hz`
    ///
    /// Falls back to the slowest setting (divide by 256) when even that is
    /// faster than requested.
    pub const fn for_target(bus_clock: u32, target_hz: u32) -> Self {
        let mut bits = 0u8;
        while bits < 7 {
            if bus_clock >> (bits + 1) <= target_hz {
                break;
            }
            bits += 1;
        }
        Self(bits)
    }

    /// Register field value (0..=7)
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Division factor (2..=256)
    pub const fn divisor(self) -> u32 {
        2 << self.0
    }
}
