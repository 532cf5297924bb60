//! Configuration and initialization errors
//!
//! Both are fatal: a miswired board has no safe runtime fallback, so
//! every error names the peripheral class and table index at fault.

use core::fmt;

use boardconf_hal::{DescriptorError, HalError};

use crate::class::PeripheralClass;

/// What is wrong with a board table or binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigFault {
    /// A single descriptor is malformed
    Descriptor(DescriptorError),
    /// The descriptor reuses a vector already claimed by another entry
    DuplicateVector,
    /// Binding arity differs from table length
    BindingCount,
    /// Binding entries are not listed as 0, 1, 2, ...
    BindingOrder,
    /// One handler is bound to two slots
    DuplicateHandler,
}

/// A configuration error, located by class and index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConfigError {
    pub class: PeripheralClass,
    pub index: usize,
    pub fault: ConfigFault,
}

impl ConfigError {
    pub const fn new(class: PeripheralClass, index: usize, fault: ConfigFault) -> Self {
        Self {
            class,
            index,
            fault,
        }
    }

    pub const fn descriptor(class: PeripheralClass, index: usize, e: DescriptorError) -> Self {
        Self::new(class, index, ConfigFault::Descriptor(e))
    }

    /// Abort const evaluation with this error
    ///
    /// Const panics cannot format, so the message names the fault and the
    /// compiler's const-eval backtrace names the offending table.
    pub const fn raise(self) -> ! {
        match self.fault {
            ConfigFault::DuplicateVector => panic!("board config: duplicate interrupt vector"),
            ConfigFault::BindingCount => panic!("board config: ISR binding count != table length"),
            ConfigFault::BindingOrder => panic!("board config: ISR binding not in index order"),
            ConfigFault::DuplicateHandler => panic!("board config: handler bound to two slots"),
            ConfigFault::Descriptor(e) => match e {
                DescriptorError::InvalidPinNumber => panic!("board config: pin number out of range"),
                DescriptorError::InvalidAltFunction => {
                    panic!("board config: alternate function out of range")
                }
                DescriptorError::PinAlias => panic!("board config: two signals share one pin"),
                DescriptorError::PortMismatch => {
                    panic!("board config: pin is not on the declared port")
                }
                DescriptorError::VectorAlias => {
                    panic!("board config: two interrupt lines share one vector")
                }
                DescriptorError::NotPeripheralBus => {
                    panic!("board config: instance is not on a peripheral bus")
                }
                DescriptorError::EmptyClockMask => panic!("board config: clock-enable mask is empty"),
                DescriptorError::NotOpenDrain => panic!("board config: i2c pins must be open-drain"),
                DescriptorError::UnknownInstance => {
                    panic!("board config: instance does not exist on this chip")
                }
                DescriptorError::ClockMismatch => {
                    panic!("board config: clock gate does not match the instance")
                }
                DescriptorError::VectorMismatch => {
                    panic!("board config: vector does not match the instance")
                }
                DescriptorError::AltFunctionUnavailable => {
                    panic!("board config: alternate function not available on this pin")
                }
                DescriptorError::PortClockMismatch => {
                    panic!("board config: port clock does not feed the declared port")
                }
            },
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: ", self.class, self.index)?;
        match self.fault {
            ConfigFault::Descriptor(e) => write!(f, "{}", e),
            ConfigFault::DuplicateVector => f.write_str("duplicate interrupt vector"),
            ConfigFault::BindingCount => f.write_str("ISR binding count != table length"),
            ConfigFault::BindingOrder => f.write_str("ISR binding not in index order"),
            ConfigFault::DuplicateHandler => f.write_str("handler bound to two slots"),
        }
    }
}

/// Bring-up step that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitStage {
    /// Enabling the instance clock
    InstanceClock,
    /// Enabling a GPIO port clock
    PortClock,
    /// Routing a pin to its alternate function
    PinConfig,
    /// Class driver enabling the instance
    Enable,
    /// Setting interrupt priority
    Priority,
    /// Unmasking the interrupt
    Unmask,
}

/// Bring-up failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InitError {
    /// The board failed validation; nothing was touched
    Config(ConfigError),
    /// A collaborator failed part way through
    Hal {
        class: PeripheralClass,
        index: usize,
        stage: InitStage,
        cause: HalError,
    },
}

impl From<ConfigError> for InitError {
    fn from(e: ConfigError) -> Self {
        InitError::Config(e)
    }
}

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitError::Config(e) => write!(f, "invalid board: {}", e),
            InitError::Hal {
                class,
                index,
                stage,
                cause,
            } => write!(f, "{} {}: {:?} failed: {}", class, index, stage, cause),
        }
    }
}
