//! Interrupt dispatch
//!
//! Maps a raw vector number to the `(line, index)` pair that owns it and
//! hands it to the driver layer. Lookup is a single array index; nothing
//! here scans descriptor tables in interrupt context.
//!
//! Two paths lead to a sink:
//!
//! - per-slot entry functions generated by [`bind_isrs!`](crate::bind_isrs)
//!   already know their `(line, index)` and call [`route`],
//! - a shared handler that only knows the active vector uses
//!   [`Dispatcher::dispatch`].

use boardconf_hal::{I2cDescriptor, SpiDescriptor, TimerDescriptor, UartDescriptor, Vector};
use embassy_sync::once_lock::OnceLock;

use crate::class::Line;
use crate::error::{ConfigError, ConfigFault};

/// Owner of a vector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Route {
    pub line: Line,
    /// Table index of the instance
    pub index: usize,
}

/// Receiver of routed interrupts
///
/// Implemented by the driver layer. Each callback gets the table index so
/// the driver can find the right per-instance state.
pub trait InterruptSink {
    fn on_timer(&self, index: usize) {
        let _ = index;
    }

    fn on_uart(&self, index: usize) {
        let _ = index;
    }

    fn on_spi(&self, index: usize) {
        let _ = index;
    }

    fn on_i2c_event(&self, index: usize) {
        let _ = index;
    }

    fn on_i2c_error(&self, index: usize) {
        let _ = index;
    }

    /// Call the callback matching a route
    fn deliver(&self, route: Route) {
        match route.line {
            Line::Timer => self.on_timer(route.index),
            Line::Uart => self.on_uart(route.index),
            Line::Spi => self.on_spi(route.index),
            Line::I2cEvent => self.on_i2c_event(route.index),
            Line::I2cError => self.on_i2c_error(route.index),
        }
    }
}

/// Dense vector-to-route table for a controller with `V` vectors
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<const V: usize> {
    routes: [Option<Route>; V],
}

impl<const V: usize> Default for Dispatcher<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const V: usize> Dispatcher<V> {
    /// Empty table
    pub const fn new() -> Self {
        Self { routes: [None; V] }
    }

    const fn claim(mut self, vector: Vector, line: Line, index: usize) -> Self {
        let slot = vector.index();
        if slot >= V {
            panic!("board config: vector outside interrupt controller range");
        }
        if self.routes[slot].is_some() {
            ConfigError::new(line.class(), index, ConfigFault::DuplicateVector).raise()
        }
        self.routes[slot] = Some(Route { line, index });
        self
    }

    /// Route every timer vector
    pub const fn timers(mut self, entries: &[TimerDescriptor]) -> Self {
        let mut i = 0;
        while i < entries.len() {
            self = self.claim(entries[i].vector, Line::Timer, i);
            i += 1;
        }
        self
    }

    /// Route every UART vector
    pub const fn uarts(mut self, entries: &[UartDescriptor]) -> Self {
        let mut i = 0;
        while i < entries.len() {
            self = self.claim(entries[i].vector, Line::Uart, i);
            i += 1;
        }
        self
    }

    /// Route every SPI vector
    pub const fn spis(mut self, entries: &[SpiDescriptor]) -> Self {
        let mut i = 0;
        while i < entries.len() {
            self = self.claim(entries[i].vector, Line::Spi, i);
            i += 1;
        }
        self
    }

    /// Route every I2C event and error vector
    pub const fn i2cs(mut self, entries: &[I2cDescriptor]) -> Self {
        let mut i = 0;
        while i < entries.len() {
            self = self.claim(entries[i].event_vector, Line::I2cEvent, i);
            self = self.claim(entries[i].error_vector, Line::I2cError, i);
            i += 1;
        }
        self
    }

    /// Owner of a vector, if any
    pub const fn lookup(&self, vector: Vector) -> Option<Route> {
        let slot = vector.index();
        if slot < V {
            self.routes[slot]
        } else {
            None
        }
    }

    /// Route a vector to the sink
    ///
    /// Returns the route taken, or `None` for a vector no descriptor owns.
    pub fn dispatch(&self, vector: Vector, sink: &dyn InterruptSink) -> Option<Route> {
        match self.lookup(vector) {
            Some(route) => {
                sink.deliver(route);
                Some(route)
            }
            None => {
                warn!("spurious interrupt on vector {}", vector.0);
                None
            }
        }
    }

    /// Number of routed vectors
    pub fn routed(&self) -> usize {
        self.routes.iter().filter(|r| r.is_some()).count()
    }

    /// `(vector, route)` for every routed vector, by vector number
    pub fn routes(&self) -> impl Iterator<Item = (Vector, Route)> + '_ {
        self.routes
            .iter()
            .enumerate()
            .filter_map(|(v, r)| r.map(|route| (Vector(v as u16), route)))
    }
}

static SINK: OnceLock<&'static (dyn InterruptSink + Sync)> = OnceLock::new();

/// Install the process-wide sink used by generated entry functions
///
/// Only the first call takes effect; returns `false` if a sink was
/// already installed.
pub fn install(sink: &'static (dyn InterruptSink + Sync)) -> bool {
    let installed = SINK.init(sink).is_ok();
    if !installed {
        warn!("interrupt sink already installed");
    }
    installed
}

/// Deliver an interrupt for a known slot to the installed sink
///
/// Called from entry functions generated by `bind_isrs!`. An interrupt
/// arriving before a sink is installed is dropped with a warning.
pub fn route(line: Line, index: usize) {
    match SINK.try_get() {
        Some(sink) => sink.deliver(Route { line, index }),
        None => warn!("interrupt {} {} before sink installed", line, index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::PeripheralClass;
    use boardconf_hal::{AltFunction, ClockGate, Instance, Pin, PinMode, Port};
    use core::cell::RefCell;
    use core::sync::atomic::{AtomicUsize, Ordering};
    use heapless::Vec;

    const TIMERS: [TimerDescriptor; 1] = [TimerDescriptor {
        instance: Instance::new("TIM5", 0x4000_0C00),
        clock: ClockGate::apb1(1 << 3),
        vector: Vector(46),
    }];

    const I2CS: [I2cDescriptor; 2] = [
        I2cDescriptor {
            instance: Instance::new("I2C1", 0x4000_5400),
            clock: ClockGate::apb1(1 << 21),
            scl: Pin::new(Port::B, 8),
            sda: Pin::new(Port::B, 9),
            mode: PinMode::OpenDrainPullUp,
            af: AltFunction::AF4,
            error_vector: Vector(32),
            event_vector: Vector(31),
        },
        I2cDescriptor {
            instance: Instance::new("I2C2", 0x4000_5800),
            clock: ClockGate::apb1(1 << 22),
            scl: Pin::new(Port::B, 10),
            sda: Pin::new(Port::B, 11),
            mode: PinMode::OpenDrainPullUp,
            af: AltFunction::AF4,
            error_vector: Vector(34),
            event_vector: Vector(33),
        },
    ];

    const DISPATCH: Dispatcher<57> = Dispatcher::new().timers(&TIMERS).i2cs(&I2CS);

    #[derive(Default)]
    struct Log {
        calls: RefCell<Vec<(Line, usize), 8>>,
    }

    impl InterruptSink for Log {
        fn on_timer(&self, index: usize) {
            self.calls.borrow_mut().push((Line::Timer, index)).unwrap();
        }

        fn on_i2c_event(&self, index: usize) {
            self.calls.borrow_mut().push((Line::I2cEvent, index)).unwrap();
        }

        fn on_i2c_error(&self, index: usize) {
            self.calls.borrow_mut().push((Line::I2cError, index)).unwrap();
        }
    }

    #[test]
    fn test_lookup() {
        assert_eq!(
            DISPATCH.lookup(Vector(46)),
            Some(Route {
                line: Line::Timer,
                index: 0
            })
        );
        assert_eq!(
            DISPATCH.lookup(Vector(34)),
            Some(Route {
                line: Line::I2cError,
                index: 1
            })
        );
        assert_eq!(DISPATCH.lookup(Vector(0)), None);
        assert_eq!(DISPATCH.lookup(Vector(500)), None);
        assert_eq!(DISPATCH.routed(), 5);
    }

    #[test]
    fn test_dispatch_reaches_right_slot() {
        let log = Log::default();
        DISPATCH.dispatch(Vector(33), &log);
        DISPATCH.dispatch(Vector(32), &log);
        DISPATCH.dispatch(Vector(46), &log);
        assert_eq!(
            log.calls.borrow().as_slice(),
            &[(Line::I2cEvent, 1), (Line::I2cError, 0), (Line::Timer, 0)]
        );
    }

    #[test]
    fn test_spurious_vector_ignored() {
        let log = Log::default();
        assert!(DISPATCH.dispatch(Vector(5), &log).is_none());
        assert!(log.calls.borrow().is_empty());
    }

    #[test]
    fn test_routes_listed_by_vector() {
        let vectors: Vec<u16, 8> = DISPATCH.routes().map(|(v, _)| v.0).collect();
        assert_eq!(vectors.as_slice(), &[31, 32, 33, 34, 46]);
        for (_, route) in DISPATCH.routes() {
            assert!(matches!(
                route.line.class(),
                PeripheralClass::Timer | PeripheralClass::I2c
            ));
        }
    }

    #[test]
    #[should_panic(expected = "duplicate interrupt vector")]
    fn test_vector_claimed_twice() {
        let _ = Dispatcher::<57>::new().timers(&TIMERS).timers(&TIMERS);
    }

    static UART_HITS: AtomicUsize = AtomicUsize::new(0);

    struct Counter;

    impl InterruptSink for Counter {
        fn on_uart(&self, index: usize) {
            UART_HITS.fetch_add(index + 1, Ordering::SeqCst);
        }
    }

    static COUNTER: Counter = Counter;

    #[test]
    fn test_global_route() {
        assert!(install(&COUNTER));
        assert!(!install(&COUNTER));
        route(Line::Uart, 1);
        route(Line::Spi, 0);
        assert_eq!(UART_HITS.load(Ordering::SeqCst), 2);
    }
}
