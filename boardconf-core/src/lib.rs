//! Board-agnostic core of the peripheral descriptor layer
//!
//! This crate contains everything that does not depend on a particular
//! board or chip:
//!
//! - Descriptor tables with compile-time validation
//! - Index-to-handler ISR bindings and the `bind_isrs!` macro
//! - Whole-board validation pass
//! - Bring-up (clock, pins, driver enable, interrupt arm)
//! - O(1) vector dispatch
//! - Per-instance runtime state guarded per index

#![no_std]
#![deny(unsafe_code)]

mod fmt;

pub mod binding;
pub mod board;
pub mod class;
pub mod dispatch;
pub mod error;
pub mod init;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod state;
pub mod table;
pub mod validate;

pub use binding::{IsrBinding, IsrEntry, IsrFn, VectorTable};
pub use board::{Board, Priorities};
pub use class::{Line, PeripheralClass};
pub use dispatch::{Dispatcher, InterruptSink, Route};
pub use error::{ConfigError, ConfigFault, InitError, InitStage};
pub use init::{BringUp, InstanceDriver, Initializer, Platform};
pub use table::DescriptorTable;

// Used by `bind_isrs!` expansions in board crates
#[doc(hidden)]
pub use boardconf_hal as hal;
