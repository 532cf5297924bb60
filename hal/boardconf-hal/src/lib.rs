//! boardconf Hardware Abstraction Layer
//!
//! This crate defines the descriptor schema every board table is written
//! in, plus the collaborator traits the generic bring-up code drives. Chip
//! crates (STM32L1, ...) implement the traits; board crates instantiate the
//! descriptors.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Board crate (boardconf-limifrog, ...)  │
//! └─────────────────────────────────────────┘
//!                     │  const descriptor tables
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  boardconf-core (tables, init, dispatch)│
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  boardconf-hal (this crate - schema)    │
//! └─────────────────────────────────────────┘
//!                     ▲
//!                     │  trait impls
//!           ┌───────────────────┐
//!           │ boardconf-hal-    │
//!           │    stm32l1        │
//!           └───────────────────┘
//! ```
//!
//! # Descriptors
//!
//! - [`timer::TimerDescriptor`]
//! - [`uart::UartDescriptor`]
//! - [`spi::SpiDescriptor`]
//! - [`i2c::I2cDescriptor`]
//!
//! # Collaborator traits
//!
//! - [`clock::ClockControl`] - bus clock gating
//! - [`gpio::PinMux`] - alternate function routing
//! - [`irq::InterruptController`] - priority, mask and unmask

#![no_std]
#![deny(unsafe_code)]

pub mod clock;
pub mod error;
pub mod gpio;
pub mod i2c;
pub mod irq;
pub mod spi;
pub mod timer;
pub mod uart;

pub use clock::{Bus, BusClocks, ClockControl, ClockGate, ClockTree};
pub use error::{DescriptorError, HalError};
pub use gpio::{AltFunction, Pin, PinMode, PinMux, Port};
pub use i2c::I2cDescriptor;
pub use irq::{InterruptController, Priority, Vector};
pub use spi::SpiDescriptor;
pub use timer::TimerDescriptor;
pub use uart::UartDescriptor;

/// A hardware peripheral instance
///
/// Identifies one block of silicon by its register base address. The name
/// is only used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(C)]
pub struct Instance {
    /// Register block base address
    pub base: u32,
    /// Datasheet name (e.g. "USART3")
    pub name: &'static str,
}

impl Instance {
    /// Create an instance identifier
    pub const fn new(name: &'static str, base: u32) -> Self {
        Self { base, name }
    }
}
