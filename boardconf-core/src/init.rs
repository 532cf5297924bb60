//! Peripheral bring-up
//!
//! Walks the board tables and brings every instance up with the same
//! per-entry sequence:
//!
//! 1. instance clock on
//! 2. for each signal pin: port clock on, then pin routed to its
//!    alternate function
//! 3. class driver enables the instance with its bus frequency
//! 4. interrupt priority set, then the vector unmasked
//!
//! Classes are brought up timers first, then UARTs, SPI and I2C, each in
//! table order. Clock enables are idempotent, so two entries sharing a
//! port (or an instance clock) simply re-enable it.

use boardconf_hal::{
    AltFunction, ClockControl, ClockGate, HalError, I2cDescriptor, InterruptController, Pin,
    PinMode, PinMux, Priority, SpiDescriptor, TimerDescriptor, UartDescriptor, Vector,
};

use crate::board::Board;
use crate::class::PeripheralClass;
use crate::error::{InitError, InitStage};
use crate::validate::validate_board;

/// Everything bring-up needs from the chip
pub trait Platform: ClockControl + PinMux + InterruptController {}

impl<T: ClockControl + PinMux + InterruptController> Platform for T {}

/// Per-class driver hooks run once clocks and pins are ready
///
/// `clock_hz` is the frequency of the bus feeding the instance (the timer
/// kernel clock for timers). Every hook defaults to doing nothing.
pub trait InstanceDriver {
    fn enable_timer(
        &mut self,
        index: usize,
        desc: &TimerDescriptor,
        clock_hz: u32,
    ) -> Result<(), HalError> {
        let _ = (index, desc, clock_hz);
        Ok(())
    }

    fn enable_uart(
        &mut self,
        index: usize,
        desc: &UartDescriptor,
        clock_hz: u32,
    ) -> Result<(), HalError> {
        let _ = (index, desc, clock_hz);
        Ok(())
    }

    fn enable_spi(
        &mut self,
        index: usize,
        desc: &SpiDescriptor,
        clock_hz: u32,
    ) -> Result<(), HalError> {
        let _ = (index, desc, clock_hz);
        Ok(())
    }

    fn enable_i2c(
        &mut self,
        index: usize,
        desc: &I2cDescriptor,
        clock_hz: u32,
    ) -> Result<(), HalError> {
        let _ = (index, desc, clock_hz);
        Ok(())
    }
}

/// No class drivers; instances get clocks, pins and interrupts only
impl InstanceDriver for () {}

/// Instances brought up per class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BringUp {
    pub timers: usize,
    pub uarts: usize,
    pub spis: usize,
    pub i2cs: usize,
}

/// Drives bring-up of a board against a platform and its drivers
pub struct Initializer<'a, P, D> {
    platform: &'a mut P,
    drivers: &'a mut D,
}

fn at(
    class: PeripheralClass,
    index: usize,
    stage: InitStage,
) -> impl FnOnce(HalError) -> InitError {
    move |cause| InitError::Hal {
        class,
        index,
        stage,
        cause,
    }
}

impl<'a, P: Platform, D: InstanceDriver> Initializer<'a, P, D> {
    pub fn new(platform: &'a mut P, drivers: &'a mut D) -> Self {
        Self { platform, drivers }
    }

    fn clock(
        &mut self,
        class: PeripheralClass,
        index: usize,
        stage: InitStage,
        gate: ClockGate,
    ) -> Result<(), InitError> {
        self.platform.enable(gate).map_err(at(class, index, stage))
    }

    fn route_pin(
        &mut self,
        class: PeripheralClass,
        index: usize,
        pin: Pin,
        af: AltFunction,
        mode: PinMode,
    ) -> Result<(), InitError> {
        let gate = self.platform.port_gate(pin.port);
        self.clock(class, index, InitStage::PortClock, gate)?;
        trace!("{} {}: P{}{} af {}", class, index, pin.port, pin.number, af.bits());
        self.platform
            .configure_af(pin, af, mode)
            .map_err(at(class, index, InitStage::PinConfig))
    }

    fn arm(
        &mut self,
        class: PeripheralClass,
        index: usize,
        vector: Vector,
        priority: Priority,
    ) -> Result<(), InitError> {
        self.platform
            .set_priority(vector, priority)
            .map_err(at(class, index, InitStage::Priority))?;
        self.platform
            .unmask(vector)
            .map_err(at(class, index, InitStage::Unmask))
    }

    /// Bring up every timer
    pub fn init_timers(&mut self, board: &Board) -> Result<usize, InitError> {
        let class = PeripheralClass::Timer;
        let priority = board.priorities.of(class);
        for (i, d) in board.timers.iter().enumerate() {
            self.clock(class, i, InitStage::InstanceClock, d.clock)?;
            let hz = board.clocks.timer_frequency(d.clock.bus);
            self.drivers
                .enable_timer(i, d, hz)
                .map_err(at(class, i, InitStage::Enable))?;
            self.arm(class, i, d.vector, priority)?;
            debug!("timer {}: {} up at {} Hz", i, d.instance.name, hz);
        }
        Ok(board.timers.len())
    }

    /// Bring up every UART
    ///
    /// RX gets a pull-up so an unconnected line idles high.
    pub fn init_uarts(&mut self, board: &Board) -> Result<usize, InitError> {
        let class = PeripheralClass::Uart;
        let priority = board.priorities.of(class);
        for (i, d) in board.uarts.iter().enumerate() {
            self.clock(class, i, InitStage::InstanceClock, d.clock)?;
            self.route_pin(class, i, d.rx, d.rx_af, PinMode::PushPullPullUp)?;
            self.route_pin(class, i, d.tx, d.tx_af, PinMode::PushPull)?;
            let hz = board.bus_frequency(d.bus());
            self.drivers
                .enable_uart(i, d, hz)
                .map_err(at(class, i, InitStage::Enable))?;
            self.arm(class, i, d.vector, priority)?;
            debug!("uart {}: {} up at {} Hz", i, d.instance.name, hz);
        }
        Ok(board.uarts.len())
    }

    /// Bring up every SPI
    ///
    /// The descriptor's own port clock is enabled before the three pins.
    pub fn init_spis(&mut self, board: &Board) -> Result<usize, InitError> {
        let class = PeripheralClass::Spi;
        let priority = board.priorities.of(class);
        for (i, d) in board.spis.iter().enumerate() {
            self.clock(class, i, InitStage::InstanceClock, d.clock)?;
            self.clock(class, i, InitStage::PortClock, d.port_clock)?;
            for pin in d.pins() {
                self.route_pin(class, i, pin, d.af, PinMode::PushPull)?;
            }
            let hz = board.bus_frequency(d.clock.bus);
            self.drivers
                .enable_spi(i, d, hz)
                .map_err(at(class, i, InitStage::Enable))?;
            self.arm(class, i, d.vector, priority)?;
            debug!("spi {}: {} up at {} Hz", i, d.instance.name, hz);
        }
        Ok(board.spis.len())
    }

    /// Bring up every I2C, arming the event vector before the error vector
    pub fn init_i2cs(&mut self, board: &Board) -> Result<usize, InitError> {
        let class = PeripheralClass::I2c;
        let priority = board.priorities.of(class);
        for (i, d) in board.i2cs.iter().enumerate() {
            self.clock(class, i, InitStage::InstanceClock, d.clock)?;
            for pin in d.pins() {
                self.route_pin(class, i, pin, d.af, d.mode)?;
            }
            let hz = board.bus_frequency(d.clock.bus);
            self.drivers
                .enable_i2c(i, d, hz)
                .map_err(at(class, i, InitStage::Enable))?;
            for vector in d.vectors() {
                self.arm(class, i, vector, priority)?;
            }
            debug!("i2c {}: {} up at {} Hz", i, d.instance.name, hz);
        }
        Ok(board.i2cs.len())
    }

    /// Validate the board, then bring up every class
    ///
    /// Nothing is touched if validation fails; the first error found is
    /// returned.
    pub fn bring_up(&mut self, board: &Board) -> Result<BringUp, InitError> {
        if let Err(errors) = validate_board(board) {
            if let Some(first) = errors.first() {
                return Err(InitError::Config(*first));
            }
        }

        let done = BringUp {
            timers: self.init_timers(board)?,
            uarts: self.init_uarts(board)?,
            spis: self.init_spis(board)?,
            i2cs: self.init_i2cs(board)?,
        };
        info!(
            "board {}: {} timers, {} uarts, {} spis, {} i2cs up",
            board.name,
            done.timers,
            done.uarts,
            done.spis,
            done.i2cs
        );
        Ok(done)
    }

    /// [`bring_up`](Self::bring_up), halting on failure
    ///
    /// A board that cannot come up has no safe fallback.
    pub fn bring_up_or_halt(&mut self, board: &Board) -> BringUp {
        match self.bring_up(board) {
            Ok(done) => done,
            Err(e) => {
                error!("board {}: bring-up failed: {}", board.name, e);
                panic!("board {}: bring-up failed: {}", board.name, e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Priorities;
    use crate::error::ConfigFault;
    use crate::mock::{self, Action, MockDrivers, MockPlatform};
    use boardconf_hal::{Bus, BusClocks, Instance, Port};

    const CLOCKS: BusClocks = BusClocks {
        core: 32_000_000,
        ahb: 32_000_000,
        apb1: 16_000_000,
        apb2: 32_000_000,
        apb1_timer: 32_000_000,
        apb2_timer: 32_000_000,
    };

    const TIMERS: [TimerDescriptor; 1] = [TimerDescriptor {
        instance: Instance::new("TIM5", 0x4000_0C00),
        clock: ClockGate::apb1(1 << 3),
        vector: Vector(46),
    }];

    const UARTS: [UartDescriptor; 2] = [
        UartDescriptor {
            instance: Instance::new("USART3", 0x4000_4800),
            clock: ClockGate::apb1(1 << 18),
            rx: Pin::new(Port::C, 11),
            tx: Pin::new(Port::C, 10),
            rx_af: AltFunction::AF7,
            tx_af: AltFunction::AF7,
            vector: Vector(39),
        },
        UartDescriptor {
            instance: Instance::new("USART1", 0x4001_3800),
            clock: ClockGate::apb2(1 << 14),
            rx: Pin::new(Port::A, 10),
            tx: Pin::new(Port::A, 9),
            rx_af: AltFunction::AF7,
            tx_af: AltFunction::AF7,
            vector: Vector(37),
        },
    ];

    const SPIS: [SpiDescriptor; 1] = [SpiDescriptor {
        instance: Instance::new("SPI1", 0x4001_3000),
        clock: ClockGate::apb2(1 << 12),
        vector: Vector(35),
        port: Port::A,
        port_clock: ClockGate::ahb(1 << 0),
        sck: 5,
        mosi: 7,
        miso: 6,
        af: AltFunction::AF5,
    }];

    const I2CS: [I2cDescriptor; 1] = [I2cDescriptor {
        instance: Instance::new("I2C1", 0x4000_5400),
        clock: ClockGate::apb1(1 << 21),
        scl: Pin::new(Port::B, 8),
        sda: Pin::new(Port::B, 9),
        mode: PinMode::OpenDrainPullUp,
        af: AltFunction::AF4,
        error_vector: Vector(32),
        event_vector: Vector(31),
    }];

    const BOARD: Board = Board {
        name: "test",
        clocks: CLOCKS,
        priorities: Priorities::uniform(Priority(1)),
        timers: &TIMERS,
        uarts: &UARTS,
        spis: &SPIS,
        i2cs: &I2CS,
    };

    fn pin_af(port: Port, number: u8, af: AltFunction, mode: PinMode) -> Action {
        Action::PinAf {
            pin: Pin::new(port, number),
            af,
            mode,
        }
    }

    #[test]
    fn test_uart_sequence_per_entry() {
        let trace = mock::trace();
        let mut platform = MockPlatform::new(&trace);
        let mut drivers = MockDrivers::new(&trace);
        let board = Board {
            timers: &[],
            spis: &[],
            i2cs: &[],
            ..BOARD
        };
        let done = Initializer::new(&mut platform, &mut drivers)
            .bring_up(&board)
            .unwrap();
        assert_eq!(done.uarts, 2);

        let expected = [
            Action::ClockOn(ClockGate::apb1(1 << 18)),
            Action::ClockOn(ClockGate::ahb(1 << 2)),
            pin_af(Port::C, 11, AltFunction::AF7, PinMode::PushPullPullUp),
            Action::ClockOn(ClockGate::ahb(1 << 2)),
            pin_af(Port::C, 10, AltFunction::AF7, PinMode::PushPull),
            Action::Enable {
                class: PeripheralClass::Uart,
                index: 0,
                clock_hz: 16_000_000,
            },
            Action::Priority(Vector(39), Priority(1)),
            Action::Unmask(Vector(39)),
            Action::ClockOn(ClockGate::apb2(1 << 14)),
            Action::ClockOn(ClockGate::ahb(1 << 0)),
            pin_af(Port::A, 10, AltFunction::AF7, PinMode::PushPullPullUp),
            Action::ClockOn(ClockGate::ahb(1 << 0)),
            pin_af(Port::A, 9, AltFunction::AF7, PinMode::PushPull),
            Action::Enable {
                class: PeripheralClass::Uart,
                index: 1,
                clock_hz: 32_000_000,
            },
            Action::Priority(Vector(37), Priority(1)),
            Action::Unmask(Vector(37)),
        ];
        assert_eq!(trace.borrow().as_slice(), &expected);
    }

    #[test]
    fn test_full_board_class_order() {
        let trace = mock::trace();
        let mut platform = MockPlatform::new(&trace);
        let mut drivers = MockDrivers::new(&trace);
        let done = Initializer::new(&mut platform, &mut drivers)
            .bring_up(&BOARD)
            .unwrap();
        assert_eq!(
            done,
            BringUp {
                timers: 1,
                uarts: 2,
                spis: 1,
                i2cs: 1
            }
        );

        let timer = mock::position(&trace, Action::Unmask(Vector(46))).unwrap();
        let uart = mock::position(&trace, Action::Unmask(Vector(37))).unwrap();
        let spi = mock::position(&trace, Action::Unmask(Vector(35))).unwrap();
        let i2c_ev = mock::position(&trace, Action::Unmask(Vector(31))).unwrap();
        let i2c_er = mock::position(&trace, Action::Unmask(Vector(32))).unwrap();
        assert!(timer < uart && uart < spi && spi < i2c_ev && i2c_ev < i2c_er);
        assert_eq!(platform.unmasked_count(), 6);
        assert_eq!(platform.priority(Vector(32)), Some(Priority(1)));
    }

    #[test]
    fn test_port_clock_precedes_pins_and_unmask() {
        let trace = mock::trace();
        let mut platform = MockPlatform::new(&trace);
        let mut drivers = MockDrivers::new(&trace);
        Initializer::new(&mut platform, &mut drivers)
            .bring_up(&BOARD)
            .unwrap();

        let port_b = mock::position(&trace, Action::ClockOn(ClockGate::ahb(1 << 1))).unwrap();
        let scl = mock::position(
            &trace,
            pin_af(Port::B, 8, AltFunction::AF4, PinMode::OpenDrainPullUp),
        )
        .unwrap();
        let unmask = mock::position(&trace, Action::Unmask(Vector(31))).unwrap();
        assert!(port_b < scl && scl < unmask);

        let spi_clock = mock::position(&trace, Action::ClockOn(ClockGate::apb2(1 << 12))).unwrap();
        let sck = mock::position(&trace, pin_af(Port::A, 5, AltFunction::AF5, PinMode::PushPull))
            .unwrap();
        assert!(spi_clock < sck);
    }

    #[test]
    fn test_shared_port_clock_enabled_once() {
        let trace = mock::trace();
        let mut platform = MockPlatform::new(&trace);
        let mut drivers = MockDrivers::new(&trace);
        Initializer::new(&mut platform, &mut drivers)
            .bring_up(&BOARD)
            .unwrap();

        // TIM5, USART3, USART1, SPI1, I2C1 and ports A, B, C
        assert_eq!(platform.clock_writes(), 8);
        assert_eq!(platform.enabled()[Bus::Ahb as usize], 0b111);

        let port_a_calls = trace
            .borrow()
            .iter()
            .filter(|a| **a == Action::ClockOn(ClockGate::ahb(1 << 0)))
            .count();
        assert!(port_a_calls > 1);
    }

    #[test]
    fn test_timer_gets_kernel_clock() {
        let trace = mock::trace();
        let mut platform = MockPlatform::new(&trace);
        let mut drivers = MockDrivers::new(&trace);
        Initializer::new(&mut platform, &mut drivers)
            .init_timers(&BOARD)
            .unwrap();
        assert!(mock::position(
            &trace,
            Action::Enable {
                class: PeripheralClass::Timer,
                index: 0,
                clock_hz: 32_000_000
            }
        )
        .is_some());
    }

    #[test]
    fn test_failure_names_class_index_and_stage() {
        let trace = mock::trace();
        let mut platform = MockPlatform::new(&trace).fail_pin(Pin::new(Port::A, 9));
        let mut drivers = MockDrivers::new(&trace);
        let err = Initializer::new(&mut platform, &mut drivers)
            .bring_up(&BOARD)
            .unwrap_err();
        assert_eq!(
            err,
            InitError::Hal {
                class: PeripheralClass::Uart,
                index: 1,
                stage: InitStage::PinConfig,
                cause: HalError::InvalidPin,
            }
        );
        // USART1 never got unmasked
        assert!(!platform.is_unmasked(Vector(37)));
    }

    #[test]
    fn test_driver_failure_stops_before_unmask() {
        let trace = mock::trace();
        let mut platform = MockPlatform::new(&trace);
        let mut drivers = MockDrivers::new(&trace).fail(PeripheralClass::Spi, 0);
        let err = Initializer::new(&mut platform, &mut drivers)
            .bring_up(&BOARD)
            .unwrap_err();
        assert!(matches!(
            err,
            InitError::Hal {
                class: PeripheralClass::Spi,
                stage: InitStage::Enable,
                ..
            }
        ));
        assert!(!platform.is_unmasked(Vector(35)));
    }

    #[test]
    fn test_invalid_board_touches_nothing() {
        static CLASH: [TimerDescriptor; 1] = [TimerDescriptor {
            instance: Instance::new("TIM2", 0x4000_0000),
            clock: ClockGate::apb1(1 << 0),
            vector: Vector(39),
        }];
        let trace = mock::trace();
        let mut platform = MockPlatform::new(&trace);
        let board = Board {
            timers: &CLASH,
            ..BOARD
        };
        let err = Initializer::new(&mut platform, &mut ())
            .bring_up(&board)
            .unwrap_err();
        match err {
            InitError::Config(e) => assert_eq!(e.fault, ConfigFault::DuplicateVector),
            other => panic!("unexpected {:?}", other),
        }
        assert!(trace.borrow().is_empty());
    }

    #[test]
    #[should_panic(expected = "bring-up failed")]
    fn test_halt_on_failure() {
        let trace = mock::trace();
        let mut platform = MockPlatform::new(&trace).fail_unmask(Vector(46));
        Initializer::new(&mut platform, &mut ()).bring_up_or_halt(&BOARD);
    }
}
