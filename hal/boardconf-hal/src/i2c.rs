//! I2C descriptor and bus timing

use crate::clock::ClockGate;
use crate::error::DescriptorError;
use crate::gpio::{AltFunction, Pin, PinMode};
use crate::irq::Vector;
use crate::Instance;

/// One I2C instance and its wiring
///
/// I2C instances raise two separate interrupts: one for bus events and one
/// for errors. Both must be distinct and each gets its own handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(C)]
pub struct I2cDescriptor {
    pub instance: Instance,
    pub clock: ClockGate,
    pub scl: Pin,
    pub sda: Pin,
    /// Electrical mode of both lines (open-drain)
    pub mode: PinMode,
    pub af: AltFunction,
    pub error_vector: Vector,
    pub event_vector: Vector,
}

impl I2cDescriptor {
    /// SCL, SDA in configuration order
    pub const fn pins(&self) -> [Pin; 2] {
        [self.scl, self.sda]
    }

    /// Event, error in arming order
    pub const fn vectors(&self) -> [Vector; 2] {
        [self.event_vector, self.error_vector]
    }

    /// Validate a descriptor and hand it back
    ///
    /// Use this where a descriptor is assembled outside a checked table.
    pub const fn checked(self) -> Result<Self, DescriptorError> {
        match self.validate() {
            Ok(()) => Ok(self),
            Err(e) => Err(e),
        }
    }

    /// Check chip-independent invariants
    pub const fn validate(&self) -> Result<(), DescriptorError> {
        if let Err(e) = self.clock.validate_peripheral() {
            return Err(e);
        }
        if let Err(e) = self.scl.validate() {
            return Err(e);
        }
        if let Err(e) = self.sda.validate() {
            return Err(e);
        }
        if self.scl.same_as(&self.sda) {
            return Err(DescriptorError::PinAlias);
        }
        if self.scl.port as u8 != self.sda.port as u8 {
            return Err(DescriptorError::PortMismatch);
        }
        if !self.mode.is_open_drain() {
            return Err(DescriptorError::NotOpenDrain);
        }
        if self.error_vector.same_as(self.event_vector) {
            return Err(DescriptorError::VectorAlias);
        }
        Ok(())
    }
}

/// I2C configuration
#[derive(Debug, Clone, Copy)]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self {
            frequency: 100_000, // 100kHz standard mode
        }
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self { frequency: 400_000 };
}

/// Register timing for a clock-control style I2C peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cTiming {
    /// Peripheral input clock in MHz (CR2.FREQ)
    pub freq_mhz: u8,
    /// Clock control value (CCR)
    pub ccr: u16,
    /// Maximum rise time in input clock cycles plus one (TRISE)
    pub trise: u8,
    /// Fast-mode (duty 2:1) timing
    pub fast: bool,
}

/// Compute I2C timing from the bus clock
///
/// Returns `None` for bus clocks outside 2..=50 MHz or SCL rates above
/// 400 kHz.
pub const fn timing(bus_clock: u32, scl_hz: u32) -> Option<I2cTiming> {
    let freq_mhz = bus_clock / 1_000_000;
    if freq_mhz < 2 || freq_mhz > 50 || scl_hz == 0 || scl_hz > 400_000 {
        return None;
    }
    let fast = scl_hz > 100_000;
    let (ccr, trise) = if fast {
        let ccr = bus_clock / (scl_hz * 3);
        (if ccr < 1 { 1 } else { ccr }, freq_mhz * 300 / 1000 + 1)
    } else {
        let ccr = bus_clock / (scl_hz * 2);
        (if ccr < 4 { 4 } else { ccr }, freq_mhz + 1)
    };
    if ccr > 0x0FFF {
        return None;
    }
    Some(I2cTiming {
        freq_mhz: freq_mhz as u8,
        ccr: ccr as u16,
        trise: trise as u8,
        fast,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::Port;

    fn i2c1() -> I2cDescriptor {
        I2cDescriptor {
            instance: Instance::new("I2C1", 0x4000_5400),
            clock: ClockGate::apb1(1 << 21),
            scl: Pin::new(Port::B, 8),
            sda: Pin::new(Port::B, 9),
            mode: PinMode::OpenDrainPullUp,
            af: AltFunction::AF4,
            error_vector: Vector(32),
            event_vector: Vector(31),
        }
    }

    #[test]
    fn test_valid_descriptor() {
        assert!(i2c1().checked().is_ok());
        assert_eq!(i2c1().vectors(), [Vector(31), Vector(32)]);
    }

    #[test]
    fn test_scl_equal_sda_rejected() {
        let bad = I2cDescriptor {
            sda: Pin::new(Port::B, 8),
            ..i2c1()
        };
        assert_eq!(bad.checked(), Err(DescriptorError::PinAlias));
    }

    #[test]
    fn test_split_ports_rejected() {
        let bad = I2cDescriptor {
            sda: Pin::new(Port::C, 9),
            ..i2c1()
        };
        assert_eq!(bad.validate(), Err(DescriptorError::PortMismatch));
    }

    #[test]
    fn test_shared_vector_rejected() {
        let bad = I2cDescriptor {
            error_vector: Vector(31),
            ..i2c1()
        };
        assert_eq!(bad.validate(), Err(DescriptorError::VectorAlias));
    }

    #[test]
    fn test_push_pull_rejected() {
        let bad = I2cDescriptor {
            mode: PinMode::PushPull,
            ..i2c1()
        };
        assert_eq!(bad.validate(), Err(DescriptorError::NotOpenDrain));
    }

    #[test]
    fn test_timing_standard_mode() {
        let t = timing(32_000_000, 100_000).unwrap();
        assert_eq!(t.freq_mhz, 32);
        assert_eq!(t.ccr, 160);
        assert_eq!(t.trise, 33);
        assert!(!t.fast);
    }

    #[test]
    fn test_timing_fast_mode() {
        let t = timing(32_000_000, 400_000).unwrap();
        assert_eq!(t.ccr, 26);
        assert_eq!(t.trise, 10);
        assert!(t.fast);
    }

    #[test]
    fn test_timing_out_of_range() {
        assert!(timing(1_000_000, 100_000).is_none());
        assert!(timing(32_000_000, 1_000_000).is_none());
    }
}
