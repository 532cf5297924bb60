//! Whole-board configuration
//!
//! A [`Board`] bundles the four descriptor tables of one board with its
//! derived bus frequencies and interrupt priorities. Boards declare one
//! `static` instance and hand out `&'static Board`.

use boardconf_hal::{
    Bus, BusClocks, I2cDescriptor, Priority, SpiDescriptor, TimerDescriptor, UartDescriptor,
    Vector,
};

use crate::class::PeripheralClass;

/// Interrupt priority per peripheral class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Priorities {
    pub timer: Priority,
    pub uart: Priority,
    pub spi: Priority,
    pub i2c: Priority,
}

impl Priorities {
    /// Default priority for every class
    pub const DEFAULT: Priority = Priority(1);

    pub const fn uniform(priority: Priority) -> Self {
        Self {
            timer: priority,
            uart: priority,
            spi: priority,
            i2c: priority,
        }
    }

    /// Priority for a class
    pub const fn of(&self, class: PeripheralClass) -> Priority {
        match class {
            PeripheralClass::Timer => self.timer,
            PeripheralClass::Uart => self.uart,
            PeripheralClass::Spi => self.spi,
            PeripheralClass::I2c => self.i2c,
        }
    }
}

impl Default for Priorities {
    fn default() -> Self {
        Self::uniform(Self::DEFAULT)
    }
}

/// Peripheral configuration of one board
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Board {
    /// Board name, for diagnostics
    pub name: &'static str,
    /// Bus frequencies after clock-tree setup
    pub clocks: BusClocks,
    pub priorities: Priorities,
    pub timers: &'static [TimerDescriptor],
    pub uarts: &'static [UartDescriptor],
    pub spis: &'static [SpiDescriptor],
    pub i2cs: &'static [I2cDescriptor],
}

impl Board {
    /// Number of configured instances of a class
    pub const fn count(&self, class: PeripheralClass) -> usize {
        match class {
            PeripheralClass::Timer => self.timers.len(),
            PeripheralClass::Uart => self.uarts.len(),
            PeripheralClass::Spi => self.spis.len(),
            PeripheralClass::I2c => self.i2cs.len(),
        }
    }

    /// Frequency of a bus
    pub const fn bus_frequency(&self, bus: Bus) -> u32 {
        self.clocks.frequency(bus)
    }

    /// Every vector the board claims, with its owner
    ///
    /// I2C entries yield their event vector before their error vector.
    pub fn vectors(&self) -> impl Iterator<Item = (PeripheralClass, usize, Vector)> + '_ {
        let timers = self
            .timers
            .iter()
            .enumerate()
            .map(|(i, d)| (PeripheralClass::Timer, i, d.vector));
        let uarts = self
            .uarts
            .iter()
            .enumerate()
            .map(|(i, d)| (PeripheralClass::Uart, i, d.vector));
        let spis = self
            .spis
            .iter()
            .enumerate()
            .map(|(i, d)| (PeripheralClass::Spi, i, d.vector));
        let i2cs = self.i2cs.iter().enumerate().flat_map(|(i, d)| {
            d.vectors()
                .into_iter()
                .map(move |v| (PeripheralClass::I2c, i, v))
        });
        timers.chain(uarts).chain(spis).chain(i2cs)
    }
}
