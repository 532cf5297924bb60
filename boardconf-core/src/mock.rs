//! Recording collaborators for host tests
//!
//! [`MockPlatform`] and [`MockDrivers`] append every call they receive to
//! a shared [`Trace`], so tests can assert on bring-up ordering. The
//! platform also keeps enough state to check idempotence: per-bus enable
//! masks, a count of clock-register writes, priorities and the unmask set.

use core::cell::RefCell;

use boardconf_hal::{
    AltFunction, ClockControl, ClockGate, HalError, I2cDescriptor, InterruptController, Pin,
    PinMode, PinMux, Port, Priority, SpiDescriptor, TimerDescriptor, UartDescriptor, Vector,
};
use heapless::Vec;

use crate::class::PeripheralClass;
use crate::init::InstanceDriver;

/// Capacity of a trace
pub const TRACE_LEN: usize = 128;

/// Vectors the mock interrupt controller implements
pub const MOCK_VECTORS: usize = 64;

/// One recorded call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ClockOn(ClockGate),
    ClockOff(ClockGate),
    PinAf {
        pin: Pin,
        af: AltFunction,
        mode: PinMode,
    },
    Enable {
        class: PeripheralClass,
        index: usize,
        clock_hz: u32,
    },
    Priority(Vector, Priority),
    Unmask(Vector),
    Mask(Vector),
}

/// Shared, ordered call log
pub type Trace = RefCell<Vec<Action, TRACE_LEN>>;

/// Empty trace
pub const fn trace() -> Trace {
    RefCell::new(Vec::new())
}

/// Position of the first matching action
pub fn position(trace: &Trace, action: Action) -> Option<usize> {
    trace.borrow().iter().position(|a| *a == action)
}

fn record(trace: &Trace, action: Action) {
    let _ = trace.borrow_mut().push(action);
}

/// Clock, pin and interrupt collaborator
pub struct MockPlatform<'t> {
    trace: &'t Trace,
    enabled: [u32; 3],
    clock_writes: usize,
    priorities: [Option<Priority>; MOCK_VECTORS],
    unmasked: u64,
    fail_clock: Option<ClockGate>,
    fail_pin: Option<Pin>,
    fail_unmask: Option<Vector>,
    port_gates: fn(Port) -> ClockGate,
}

/// Port clocks as consecutive AHB bits, port A at bit 0
pub const fn linear_port_gate(port: Port) -> ClockGate {
    ClockGate::ahb(1 << port.index())
}

impl<'t> MockPlatform<'t> {
    pub fn new(trace: &'t Trace) -> Self {
        Self {
            trace,
            enabled: [0; 3],
            clock_writes: 0,
            priorities: [None; MOCK_VECTORS],
            unmasked: 0,
            fail_clock: None,
            fail_pin: None,
            fail_unmask: None,
            port_gates: linear_port_gate,
        }
    }

    /// Use a chip's port clock layout instead of [`linear_port_gate`]
    pub fn with_port_gates(mut self, port_gates: fn(Port) -> ClockGate) -> Self {
        self.port_gates = port_gates;
        self
    }

    /// Make enabling `gate` report [`HalError::ClockNotReady`]
    pub fn fail_clock(mut self, gate: ClockGate) -> Self {
        self.fail_clock = Some(gate);
        self
    }

    /// Make configuring `pin` report [`HalError::InvalidPin`]
    pub fn fail_pin(mut self, pin: Pin) -> Self {
        self.fail_pin = Some(pin);
        self
    }

    /// Make unmasking `vector` report [`HalError::InvalidVector`]
    pub fn fail_unmask(mut self, vector: Vector) -> Self {
        self.fail_unmask = Some(vector);
        self
    }

    /// Enable bits currently set on each bus, indexed by `Bus as usize`
    pub fn enabled(&self) -> [u32; 3] {
        self.enabled
    }

    /// Number of enable-register writes that changed a bit
    pub fn clock_writes(&self) -> usize {
        self.clock_writes
    }

    pub fn priority(&self, vector: Vector) -> Option<Priority> {
        self.priorities.get(vector.index()).copied().flatten()
    }

    /// Number of unmasked vectors
    pub fn unmasked_count(&self) -> u32 {
        self.unmasked.count_ones()
    }

    fn vector_bit(vector: Vector) -> Result<u64, HalError> {
        if vector.index() < MOCK_VECTORS {
            Ok(1 << vector.index())
        } else {
            Err(HalError::InvalidVector)
        }
    }
}

impl ClockControl for MockPlatform<'_> {
    fn enable(&mut self, gate: ClockGate) -> Result<(), HalError> {
        if self.fail_clock == Some(gate) {
            return Err(HalError::ClockNotReady);
        }
        record(self.trace, Action::ClockOn(gate));
        let reg = &mut self.enabled[gate.bus as usize];
        if *reg & gate.mask != gate.mask {
            *reg |= gate.mask;
            self.clock_writes += 1;
        }
        Ok(())
    }

    fn disable(&mut self, gate: ClockGate) -> Result<(), HalError> {
        record(self.trace, Action::ClockOff(gate));
        let reg = &mut self.enabled[gate.bus as usize];
        if *reg & gate.mask != 0 {
            *reg &= !gate.mask;
            self.clock_writes += 1;
        }
        Ok(())
    }

    fn is_enabled(&self, gate: ClockGate) -> bool {
        self.enabled[gate.bus as usize] & gate.mask == gate.mask
    }
}

impl PinMux for MockPlatform<'_> {
    fn port_gate(&self, port: Port) -> ClockGate {
        (self.port_gates)(port)
    }

    fn configure_af(&mut self, pin: Pin, af: AltFunction, mode: PinMode) -> Result<(), HalError> {
        if pin.validate().is_err() || self.fail_pin == Some(pin) {
            return Err(HalError::InvalidPin);
        }
        record(self.trace, Action::PinAf { pin, af, mode });
        Ok(())
    }
}

impl InterruptController for MockPlatform<'_> {
    fn set_priority(&mut self, vector: Vector, priority: Priority) -> Result<(), HalError> {
        Self::vector_bit(vector)?;
        if priority.0 > 15 {
            return Err(HalError::InvalidPriority);
        }
        record(self.trace, Action::Priority(vector, priority));
        self.priorities[vector.index()] = Some(priority);
        Ok(())
    }

    fn unmask(&mut self, vector: Vector) -> Result<(), HalError> {
        let bit = Self::vector_bit(vector)?;
        if self.fail_unmask == Some(vector) {
            return Err(HalError::InvalidVector);
        }
        record(self.trace, Action::Unmask(vector));
        self.unmasked |= bit;
        Ok(())
    }

    fn mask(&mut self, vector: Vector) -> Result<(), HalError> {
        let bit = Self::vector_bit(vector)?;
        record(self.trace, Action::Mask(vector));
        self.unmasked &= !bit;
        Ok(())
    }

    fn is_unmasked(&self, vector: Vector) -> bool {
        Self::vector_bit(vector)
            .map(|bit| self.unmasked & bit != 0)
            .unwrap_or(false)
    }
}

/// Class drivers that only record their enable calls
pub struct MockDrivers<'t> {
    trace: &'t Trace,
    fail: Option<(PeripheralClass, usize)>,
}

impl<'t> MockDrivers<'t> {
    pub fn new(trace: &'t Trace) -> Self {
        Self { trace, fail: None }
    }

    /// Make enabling one instance report [`HalError::ClockNotReady`]
    pub fn fail(mut self, class: PeripheralClass, index: usize) -> Self {
        self.fail = Some((class, index));
        self
    }

    fn enable(&mut self, class: PeripheralClass, index: usize, clock_hz: u32) -> Result<(), HalError> {
        if self.fail == Some((class, index)) {
            return Err(HalError::ClockNotReady);
        }
        record(
            self.trace,
            Action::Enable {
                class,
                index,
                clock_hz,
            },
        );
        Ok(())
    }
}

impl InstanceDriver for MockDrivers<'_> {
    fn enable_timer(
        &mut self,
        index: usize,
        _desc: &TimerDescriptor,
        clock_hz: u32,
    ) -> Result<(), HalError> {
        self.enable(PeripheralClass::Timer, index, clock_hz)
    }

    fn enable_uart(
        &mut self,
        index: usize,
        _desc: &UartDescriptor,
        clock_hz: u32,
    ) -> Result<(), HalError> {
        self.enable(PeripheralClass::Uart, index, clock_hz)
    }

    fn enable_spi(
        &mut self,
        index: usize,
        _desc: &SpiDescriptor,
        clock_hz: u32,
    ) -> Result<(), HalError> {
        self.enable(PeripheralClass::Spi, index, clock_hz)
    }

    fn enable_i2c(
        &mut self,
        index: usize,
        _desc: &I2cDescriptor,
        clock_hz: u32,
    ) -> Result<(), HalError> {
        self.enable(PeripheralClass::I2c, index, clock_hz)
    }
}
