//! Interrupt controller abstractions

use crate::error::HalError;

/// Hardware interrupt number (IRQn)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(transparent)]
pub struct Vector(pub u16);

impl Vector {
    /// Vector number as a table index
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Const equality
    pub const fn same_as(self, other: Vector) -> bool {
        self.0 == other.0
    }
}

/// Interrupt priority, lower value is more urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(transparent)]
pub struct Priority(pub u8);

/// Interrupt controller
///
/// Vectors are armed only after their peripheral is configured, so
/// `set_priority` is always called before `unmask`.
pub trait InterruptController {
    /// Set the priority of a vector
    fn set_priority(&mut self, vector: Vector, priority: Priority) -> Result<(), HalError>;

    /// Enable (unmask) a vector
    fn unmask(&mut self, vector: Vector) -> Result<(), HalError>;

    /// Disable (mask) a vector
    fn mask(&mut self, vector: Vector) -> Result<(), HalError>;

    /// Check whether a vector is currently unmasked
    fn is_unmasked(&self, vector: Vector) -> bool;
}
