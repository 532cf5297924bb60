//! Error types shared by descriptors and collaborators

use core::fmt;

/// A descriptor violates a schema or chip invariant
///
/// Raised while a board table is being built. None of these can be
/// recovered from at runtime: the board is simply wired wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DescriptorError {
    /// Pin number outside 0..=15
    InvalidPinNumber,
    /// Alternate function selector outside 0..=15
    InvalidAltFunction,
    /// Two signal roles share one pin
    PinAlias,
    /// A pin is not on the port the descriptor declares
    PortMismatch,
    /// Two interrupt lines of one descriptor share a vector
    VectorAlias,
    /// Instance clock is gated on a bus that cannot host it
    NotPeripheralBus,
    /// Clock-enable mask has no bit set
    EmptyClockMask,
    /// I2C lines must be open-drain
    NotOpenDrain,
    /// Instance does not exist on this chip
    UnknownInstance,
    /// Clock gate differs from the chip's gate for this instance
    ClockMismatch,
    /// Vector differs from the chip's vector for this instance
    VectorMismatch,
    /// The pin cannot carry this signal with this alternate function
    AltFunctionUnavailable,
    /// Port clock gate does not feed the declared port
    PortClockMismatch,
}

impl DescriptorError {
    /// Short human-readable description
    pub const fn as_str(&self) -> &'static str {
        match self {
            DescriptorError::InvalidPinNumber => "pin number out of range",
            DescriptorError::InvalidAltFunction => "alternate function out of range",
            DescriptorError::PinAlias => "two signals share one pin",
            DescriptorError::PortMismatch => "pin is not on the declared port",
            DescriptorError::VectorAlias => "two interrupt lines share one vector",
            DescriptorError::NotPeripheralBus => "instance is not on a peripheral bus",
            DescriptorError::EmptyClockMask => "clock-enable mask is empty",
            DescriptorError::NotOpenDrain => "i2c pins must be open-drain",
            DescriptorError::UnknownInstance => "instance does not exist on this chip",
            DescriptorError::ClockMismatch => "clock gate does not match the instance",
            DescriptorError::VectorMismatch => "vector does not match the instance",
            DescriptorError::AltFunctionUnavailable => {
                "alternate function not available on this pin"
            }
            DescriptorError::PortClockMismatch => "port clock does not feed the declared port",
        }
    }
}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A collaborator failed to bring hardware into the requested state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// A clock or oscillator did not report ready in time
    ClockNotReady,
    /// The pin does not exist on this chip
    InvalidPin,
    /// The vector is outside the interrupt controller's range
    InvalidVector,
    /// Priority exceeds the implemented priority bits
    InvalidPriority,
    /// The clock tree cannot be programmed on this chip
    UnsupportedClockTree,
    /// A requested baud or tick rate cannot be derived from the bus clock
    UnsupportedRate,
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            HalError::ClockNotReady => "clock not ready",
            HalError::InvalidPin => "invalid pin",
            HalError::InvalidVector => "invalid vector",
            HalError::InvalidPriority => "invalid priority",
            HalError::UnsupportedClockTree => "unsupported clock tree",
            HalError::UnsupportedRate => "unsupported rate",
        };
        f.write_str(msg)
    }
}
