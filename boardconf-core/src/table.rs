//! Board descriptor tables
//!
//! A table is an ordered, fixed-length list of descriptors of one class.
//! Position is meaningful: index `i` is the slot the ISR binding and the
//! driver state use for the `i`-th instance.
//!
//! Tables are built in `const` items through the per-class constructors,
//! which validate every entry. An invalid descriptor therefore fails the
//! build:
//!
//! ```ignore
//! const UART_ENTRIES: [UartDescriptor; 2] = [/* ... */];
//! pub const UARTS: DescriptorTable<UartDescriptor, 2> = DescriptorTable::uarts(&UART_ENTRIES);
//! ```

use boardconf_hal::{I2cDescriptor, SpiDescriptor, TimerDescriptor, UartDescriptor};

use crate::validate;

/// Ordered, fixed-size descriptor table
#[derive(Debug, Clone, Copy)]
pub struct DescriptorTable<D: 'static, const N: usize> {
    entries: &'static [D; N],
}

struct InBounds<const I: usize, const N: usize>;

impl<const I: usize, const N: usize> InBounds<I, N> {
    const OK: () = assert!(I < N, "descriptor index out of range");
}

impl<D: 'static, const N: usize> DescriptorTable<D, N> {
    /// Number of configured instances
    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Entries in index order
    pub const fn as_slice(&self) -> &'static [D] {
        self.entries
    }

    /// Entry at a runtime index
    pub const fn get(&self, index: usize) -> Option<&'static D> {
        let entries: &'static [D; N] = self.entries;
        if index < N {
            Some(&entries[index])
        } else {
            None
        }
    }

    /// Entry at a compile-time index
    ///
    /// An index past the end fails to compile.
    pub const fn at<const I: usize>(&self) -> &'static D {
        let () = InBounds::<I, N>::OK;
        let entries: &'static [D; N] = self.entries;
        &entries[I]
    }

    /// `(index, descriptor)` pairs in table order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &'static D)> {
        let entries: &'static [D; N] = self.entries;
        entries.iter().enumerate()
    }
}

impl<const N: usize> DescriptorTable<TimerDescriptor, N> {
    /// Build a validated timer table
    pub const fn timers(entries: &'static [TimerDescriptor; N]) -> Self {
        match validate::timers(entries) {
            Ok(()) => Self { entries },
            Err(e) => e.raise(),
        }
    }
}

impl<const N: usize> DescriptorTable<UartDescriptor, N> {
    /// Build a validated UART table
    pub const fn uarts(entries: &'static [UartDescriptor; N]) -> Self {
        match validate::uarts(entries) {
            Ok(()) => Self { entries },
            Err(e) => e.raise(),
        }
    }
}

impl<const N: usize> DescriptorTable<SpiDescriptor, N> {
    /// Build a validated SPI table
    pub const fn spis(entries: &'static [SpiDescriptor; N]) -> Self {
        match validate::spis(entries) {
            Ok(()) => Self { entries },
            Err(e) => e.raise(),
        }
    }
}

impl<const N: usize> DescriptorTable<I2cDescriptor, N> {
    /// Build a validated I2C table
    ///
    /// ```
    /// use boardconf_core::hal::{AltFunction, ClockGate, I2cDescriptor, Instance, Pin, PinMode, Port, Vector};
    /// use boardconf_core::DescriptorTable;
    ///
    /// const I2C1: [I2cDescriptor; 1] = [I2cDescriptor {
    ///     instance: Instance::new("I2C1", 0x4000_5400),
    ///     clock: ClockGate::apb1(1 << 21),
    ///     scl: Pin::new(Port::B, 8),
    ///     sda: Pin::new(Port::B, 9),
    ///     mode: PinMode::OpenDrainPullUp,
    ///     af: AltFunction::AF4,
    ///     error_vector: Vector(32),
    ///     event_vector: Vector(31),
    /// }];
    /// const I2CS: DescriptorTable<I2cDescriptor, 1> = DescriptorTable::i2cs(&I2C1);
    /// assert_eq!(I2CS.len(), 1);
    /// ```
    ///
    /// SCL and SDA on one pin fail the build:
    ///
    /// ```compile_fail
    /// use boardconf_core::hal::{AltFunction, ClockGate, I2cDescriptor, Instance, Pin, PinMode, Port, Vector};
    /// use boardconf_core::DescriptorTable;
    ///
    /// const I2C1: [I2cDescriptor; 1] = [I2cDescriptor {
    ///     instance: Instance::new("I2C1", 0x4000_5400),
    ///     clock: ClockGate::apb1(1 << 21),
    ///     scl: Pin::new(Port::B, 8),
    ///     sda: Pin::new(Port::B, 8),
    ///     mode: PinMode::OpenDrainPullUp,
    ///     af: AltFunction::AF4,
    ///     error_vector: Vector(32),
    ///     event_vector: Vector(31),
    /// }];
    /// const I2CS: DescriptorTable<I2cDescriptor, 1> = DescriptorTable::i2cs(&I2C1);
    /// assert_eq!(I2CS.len(), 1);
    /// ```
    pub const fn i2cs(entries: &'static [I2cDescriptor; N]) -> Self {
        match validate::i2cs(entries) {
            Ok(()) => Self { entries },
            Err(e) => e.raise(),
        }
    }
}
