//! Clock gating and bus frequencies
//!
//! A [`ClockGate`] names the enable bit(s) of one peripheral on one bus.
//! Enabling and disabling go through [`ClockControl`], never through raw
//! register writes in board code.

use crate::error::{DescriptorError, HalError};

/// Clock domain a peripheral hangs off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(u8)]
pub enum Bus {
    /// AHB (GPIO ports, DMA, ...)
    Ahb = 0,
    /// Low-speed peripheral bus
    Apb1 = 1,
    /// High-speed peripheral bus
    Apb2 = 2,
}

impl Bus {
    /// Peripheral buses host UART/SPI/I2C/timer instances
    pub const fn is_peripheral(self) -> bool {
        matches!(self, Bus::Apb1 | Bus::Apb2)
    }
}

/// Enable bit(s) for one peripheral on one bus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(C)]
pub struct ClockGate {
    pub bus: Bus,
    pub mask: u32,
}

impl ClockGate {
    pub const fn ahb(mask: u32) -> Self {
        Self {
            bus: Bus::Ahb,
            mask,
        }
    }

    pub const fn apb1(mask: u32) -> Self {
        Self {
            bus: Bus::Apb1,
            mask,
        }
    }

    pub const fn apb2(mask: u32) -> Self {
        Self {
            bus: Bus::Apb2,
            mask,
        }
    }

    /// Const equality
    pub const fn same_as(&self, other: &ClockGate) -> bool {
        self.bus as u8 == other.bus as u8 && self.mask == other.mask
    }

    /// Gate must enable something
    pub const fn validate(&self) -> Result<(), DescriptorError> {
        if self.mask == 0 {
            Err(DescriptorError::EmptyClockMask)
        } else {
            Ok(())
        }
    }

    /// Gate for a peripheral instance: non-empty and on APB1/APB2
    pub const fn validate_peripheral(&self) -> Result<(), DescriptorError> {
        if !self.bus.is_peripheral() {
            return Err(DescriptorError::NotPeripheralBus);
        }
        self.validate()
    }
}

/// Peripheral clock controller
///
/// `enable` must be idempotent: enabling an already running gate leaves
/// the hardware untouched.
pub trait ClockControl {
    /// Enable the gate
    fn enable(&mut self, gate: ClockGate) -> Result<(), HalError>;

    /// Disable the gate
    fn disable(&mut self, gate: ClockGate) -> Result<(), HalError>;

    /// Check whether every bit of the gate is enabled
    fn is_enabled(&self, gate: ClockGate) -> bool;
}

/// Derived bus frequencies in Hz
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BusClocks {
    pub core: u32,
    pub ahb: u32,
    pub apb1: u32,
    pub apb2: u32,
    /// Timer kernel clock on APB1 (doubled when APB1 is divided)
    pub apb1_timer: u32,
    /// Timer kernel clock on APB2 (doubled when APB2 is divided)
    pub apb2_timer: u32,
}

impl BusClocks {
    /// Frequency of a bus
    pub const fn frequency(&self, bus: Bus) -> u32 {
        match bus {
            Bus::Ahb => self.ahb,
            Bus::Apb1 => self.apb1,
            Bus::Apb2 => self.apb2,
        }
    }

    /// Timer kernel clock for timers on the given bus
    pub const fn timer_frequency(&self, bus: Bus) -> u32 {
        match bus {
            Bus::Ahb => self.ahb,
            Bus::Apb1 => self.apb1_timer,
            Bus::Apb2 => self.apb2_timer,
        }
    }
}

/// PLL-based clock tree
///
/// `core = source / pll_div * pll_mul`, then AHB and the two APB buses
/// are divided down from core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ClockTree {
    /// PLL input oscillator frequency
    pub source_hz: u32,
    pub pll_div: u32,
    pub pll_mul: u32,
    pub ahb_div: u32,
    pub apb1_div: u32,
    pub apb2_div: u32,
    /// Flash wait states
    pub flash_latency: u8,
}

impl ClockTree {
    /// Core clock produced by the PLL
    pub const fn core_clock(&self) -> u32 {
        self.source_hz / self.pll_div * self.pll_mul
    }

    /// All bus frequencies implied by this tree
    pub const fn bus_clocks(&self) -> BusClocks {
        let core = self.core_clock();
        let ahb = core / self.ahb_div;
        let apb1 = ahb / self.apb1_div;
        let apb2 = ahb / self.apb2_div;
        BusClocks {
            core,
            ahb,
            apb1,
            apb2,
            apb1_timer: if self.apb1_div == 1 { apb1 } else { apb1 * 2 },
            apb2_timer: if self.apb2_div == 1 { apb2 } else { apb2 * 2 },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TREE: ClockTree = ClockTree {
        source_hz: 16_000_000,
        pll_div: 2,
        pll_mul: 4,
        ahb_div: 1,
        apb1_div: 1,
        apb2_div: 1,
        flash_latency: 1,
    };

    #[test]
    fn test_bus_clocks_undivided() {
        let clocks = TREE.bus_clocks();
        assert_eq!(clocks.core, 32_000_000);
        assert_eq!(clocks.frequency(Bus::Apb1), 32_000_000);
        assert_eq!(clocks.timer_frequency(Bus::Apb1), 32_000_000);
    }

    #[test]
    fn test_divided_apb_doubles_timer_clock() {
        let tree = ClockTree {
            apb1_div: 2,
            ..TREE
        };
        let clocks = tree.bus_clocks();
        assert_eq!(clocks.apb1, 16_000_000);
        assert_eq!(clocks.apb1_timer, 32_000_000);
        assert_eq!(clocks.apb2_timer, 32_000_000);
    }

    #[test]
    fn test_gate_validation() {
        assert_eq!(
            ClockGate::apb1(0).validate_peripheral(),
            Err(DescriptorError::EmptyClockMask)
        );
        assert_eq!(
            ClockGate::ahb(1).validate_peripheral(),
            Err(DescriptorError::NotPeripheralBus)
        );
        assert!(ClockGate::apb2(1 << 14).validate_peripheral().is_ok());
    }
}
