//! STM32L1 support for boardconf boards
//!
//! Implements the collaborator traits bring-up drives and the chip side
//! of board validation:
//!
//! - [`Stm32l1`] - clock gating, clock tree, pin mux and NVIC
//!   ([`ClockControl`], [`PinMux`], [`InterruptController`])
//! - [`drivers::Drivers`] - register-level class drivers
//! - [`check`] - const checks that descriptors match the silicon
//!   (instances, clock gates, vectors, alternate functions)
//! - [`map`] / [`af`] - memory map, interrupt numbers and AF table
//!
//! All register access goes through [`mmio::Mmio`], so everything also
//! runs on the host against a simulated register file.
//!
//! [`ClockControl`]: boardconf_hal::ClockControl
//! [`PinMux`]: boardconf_hal::PinMux
//! [`InterruptController`]: boardconf_hal::InterruptController

#![no_std]
#![deny(unsafe_code)]

mod fmt;

pub mod af;
pub mod check;
pub mod drivers;
pub mod gpio;
pub mod map;
pub mod mmio;
pub mod nvic;
pub mod rcc;

use core::sync::atomic::{AtomicBool, Ordering};

pub use drivers::{DriverConfig, Drivers};
pub use map::IRQ_COUNT;
pub use mmio::{Hardware, Mmio};

/// The chip's clock, GPIO and NVIC blocks
pub struct Stm32l1<R> {
    regs: R,
}

impl<R: Mmio> Stm32l1<R> {
    /// Wrap a register file
    pub fn new(regs: R) -> Self {
        Self { regs }
    }

    pub fn regs(&self) -> &R {
        &self.regs
    }
}

static TAKEN: AtomicBool = AtomicBool::new(false);

impl Stm32l1<Hardware> {
    /// Claim the real chip and its class drivers; `None` after the first call
    pub fn take(config: DriverConfig) -> Option<(Self, Drivers<Hardware>)> {
        if TAKEN.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some((
            Self::new(Hardware::new()),
            Drivers::new(Hardware::new(), config),
        ))
    }
}
