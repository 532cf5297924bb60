//! Index-to-handler ISR binding
//!
//! Every table slot gets exactly one interrupt entry function, and no
//! function serves two slots. Boards declare bindings with [`bind_isrs!`],
//! which also asserts at compile time that the binding covers the table:
//!
//! ```ignore
//! bind_isrs! {
//!     pub const UART_ISRS: Uart for UARTS => {
//!         0 => isr_usart3,
//!         1 => isr_usart1,
//!     }
//! }
//! ```
//!
//! [`bind_isrs!`]: crate::bind_isrs

use boardconf_hal::{I2cDescriptor, SpiDescriptor, TimerDescriptor, UartDescriptor, Vector};

use crate::class::Line;
use crate::error::{ConfigError, ConfigFault};

/// Interrupt entry point as placed in a vector table
pub type IsrFn = extern "C" fn();

/// One slot of a binding
#[derive(Debug, Clone, Copy)]
pub struct IsrEntry {
    /// Table index this entry serves
    pub index: usize,
    /// Entry function name
    pub symbol: &'static str,
    pub handler: IsrFn,
}

impl IsrEntry {
    pub const fn new(index: usize, symbol: &'static str, handler: IsrFn) -> Self {
        Self {
            index,
            symbol,
            handler,
        }
    }

    /// Whether both entries call the same function
    pub fn same_handler(&self, other: &IsrEntry) -> bool {
        self.handler as usize == other.handler as usize
    }
}

/// Total, injective map from table index to interrupt entry
#[derive(Debug, Clone, Copy)]
pub struct IsrBinding<const N: usize> {
    line: Line,
    entries: [IsrEntry; N],
}

impl<const N: usize> IsrBinding<N> {
    /// Build a binding
    ///
    /// Entries must be listed for indices 0, 1, 2, ... in order and use
    /// distinct entry functions; anything else fails const evaluation.
    pub const fn new(line: Line, entries: [IsrEntry; N]) -> Self {
        match check_entries(line, &entries) {
            Ok(()) => Self { line, entries },
            Err(e) => e.raise(),
        }
    }

    /// Interrupt line served
    pub const fn line(&self) -> Line {
        self.line
    }

    /// Number of bound slots
    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Check the binding has one entry per table slot
    pub const fn check_covers(&self, table_len: usize) -> Result<(), ConfigError> {
        if N == table_len {
            Ok(())
        } else {
            let index = if N < table_len { N } else { table_len };
            Err(ConfigError::new(
                self.line.class(),
                index,
                ConfigFault::BindingCount,
            ))
        }
    }

    /// Fail const evaluation unless the binding covers the table
    pub const fn assert_covers(&self, table_len: usize) {
        if let Err(e) = self.check_covers(table_len) {
            e.raise()
        }
    }

    /// Check no entry function name is shared with another binding
    pub const fn check_disjoint<const M: usize>(
        &self,
        other: &IsrBinding<M>,
    ) -> Result<(), ConfigError> {
        let mut i = 0;
        while i < N {
            let mut j = 0;
            while j < M {
                if str_eq(self.entries[i].symbol, other.entries[j].symbol) {
                    return Err(ConfigError::new(
                        self.line.class(),
                        i,
                        ConfigFault::DuplicateHandler,
                    ));
                }
                j += 1;
            }
            i += 1;
        }
        Ok(())
    }

    /// Fail const evaluation if any entry function is shared with `other`
    pub const fn assert_disjoint<const M: usize>(&self, other: &IsrBinding<M>) {
        if let Err(e) = self.check_disjoint(other) {
            e.raise()
        }
    }

    /// Check by address that no entry function serves two slots
    ///
    /// Const evaluation can only compare names; this also catches one
    /// function listed under two names.
    pub fn check_injective(&self) -> Result<(), ConfigError> {
        for (i, entry) in self.entries.iter().enumerate() {
            if self.entries[..i].iter().any(|e| e.same_handler(entry)) {
                return Err(ConfigError::new(
                    self.line.class(),
                    i,
                    ConfigFault::DuplicateHandler,
                ));
            }
        }
        Ok(())
    }

    /// Check by address that no entry function is shared with `other`
    pub fn check_handlers_disjoint<const M: usize>(
        &self,
        other: &IsrBinding<M>,
    ) -> Result<(), ConfigError> {
        match self
            .entries
            .iter()
            .position(|e| other.entries.iter().any(|o| o.same_handler(e)))
        {
            Some(i) => Err(ConfigError::new(
                self.line.class(),
                i,
                ConfigFault::DuplicateHandler,
            )),
            None => Ok(()),
        }
    }

    /// Entry function for a slot
    pub fn handler(&self, index: usize) -> Option<IsrFn> {
        self.entries.get(index).map(|e| e.handler)
    }

    /// Entry function name for a slot
    pub fn symbol(&self, index: usize) -> Option<&'static str> {
        self.entries.get(index).map(|e| e.symbol)
    }

    /// Slot served by a named entry function
    pub fn index_of(&self, symbol: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|e| e.symbol == symbol)
            .map(|e| e.index)
    }

    /// All entries in index order
    pub const fn entries(&self) -> &[IsrEntry] {
        &self.entries
    }
}

/// Vector-indexed handler slots for a controller with `V` vectors
///
/// Built in const context from the descriptor tables and their bindings,
/// so a firmware can place every entry function at its vector.
#[derive(Debug, Clone, Copy)]
pub struct VectorTable<const V: usize> {
    slots: [Option<IsrFn>; V],
}

impl<const V: usize> Default for VectorTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const V: usize> VectorTable<V> {
    pub const fn new() -> Self {
        Self { slots: [None; V] }
    }

    const fn place(mut self, vector: Vector, entry: &IsrEntry, line: Line) -> Self {
        let slot = vector.index();
        if slot >= V {
            panic!("board config: vector outside interrupt controller range");
        }
        if self.slots[slot].is_some() {
            ConfigError::new(line.class(), entry.index, ConfigFault::DuplicateVector).raise()
        }
        self.slots[slot] = Some(entry.handler);
        self
    }

    const fn bound<const N: usize>(binding: &IsrBinding<N>, line: Line, len: usize) -> &[IsrEntry] {
        if !binding.line.same_as(line) {
            panic!("board config: ISR binding is for another interrupt line");
        }
        binding.assert_covers(len);
        binding.entries()
    }

    /// Place the timer entry functions
    pub const fn timers<const N: usize>(
        mut self,
        table: &[TimerDescriptor],
        binding: &IsrBinding<N>,
    ) -> Self {
        let entries = Self::bound(binding, Line::Timer, table.len());
        let mut i = 0;
        while i < table.len() {
            self = self.place(table[i].vector, &entries[i], Line::Timer);
            i += 1;
        }
        self
    }

    /// Place the UART entry functions
    pub const fn uarts<const N: usize>(
        mut self,
        table: &[UartDescriptor],
        binding: &IsrBinding<N>,
    ) -> Self {
        let entries = Self::bound(binding, Line::Uart, table.len());
        let mut i = 0;
        while i < table.len() {
            self = self.place(table[i].vector, &entries[i], Line::Uart);
            i += 1;
        }
        self
    }

    /// Place the SPI entry functions
    pub const fn spis<const N: usize>(
        mut self,
        table: &[SpiDescriptor],
        binding: &IsrBinding<N>,
    ) -> Self {
        let entries = Self::bound(binding, Line::Spi, table.len());
        let mut i = 0;
        while i < table.len() {
            self = self.place(table[i].vector, &entries[i], Line::Spi);
            i += 1;
        }
        self
    }

    /// Place the I2C event and error entry functions
    pub const fn i2cs<const N: usize, const M: usize>(
        mut self,
        table: &[I2cDescriptor],
        events: &IsrBinding<N>,
        errors: &IsrBinding<M>,
    ) -> Self {
        events.assert_disjoint(errors);
        let ev = Self::bound(events, Line::I2cEvent, table.len());
        let er = Self::bound(errors, Line::I2cError, table.len());
        let mut i = 0;
        while i < table.len() {
            self = self.place(table[i].event_vector, &ev[i], Line::I2cEvent);
            self = self.place(table[i].error_vector, &er[i], Line::I2cError);
            i += 1;
        }
        self
    }

    /// Entry function at a vector
    pub const fn get(&self, vector: Vector) -> Option<IsrFn> {
        let slot = vector.index();
        if slot < V {
            self.slots[slot]
        } else {
            None
        }
    }

    /// Every slot, by vector number
    pub const fn slots(&self) -> &[Option<IsrFn>; V] {
        &self.slots
    }
}

const fn check_entries(line: Line, entries: &[IsrEntry]) -> Result<(), ConfigError> {
    let mut i = 0;
    while i < entries.len() {
        if entries[i].index != i {
            return Err(ConfigError::new(line.class(), i, ConfigFault::BindingOrder));
        }
        let mut j = 0;
        while j < i {
            if str_eq(entries[j].symbol, entries[i].symbol) {
                return Err(ConfigError::new(
                    line.class(),
                    i,
                    ConfigFault::DuplicateHandler,
                ));
            }
            j += 1;
        }
        i += 1;
    }
    Ok(())
}

const fn str_eq(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

/// Declare the ISR binding of one interrupt line
///
/// Generates one `extern "C"` entry function per slot, which routes the
/// interrupt to the installed [`InterruptSink`](crate::InterruptSink)
/// with its slot index, then declares the binding constant and asserts
/// at compile time that it covers the table.
///
/// Lines are the variants of [`Line`](crate::Line).
#[macro_export]
macro_rules! bind_isrs {
    (
        $(#[$meta:meta])*
        $vis:vis const $name:ident: $line:ident for $table:expr => {
            $($index:literal => $isr:ident),+ $(,)?
        }
    ) => {
        $(
            #[doc = concat!("Interrupt entry for slot ", stringify!($index), " of `", stringify!($name), "`")]
            pub extern "C" fn $isr() {
                $crate::dispatch::route($crate::Line::$line, $index);
            }
        )+

        $(#[$meta])*
        $vis const $name: $crate::IsrBinding<{ [$(stringify!($isr)),+].len() }> =
            $crate::IsrBinding::new(
                $crate::Line::$line,
                [$($crate::IsrEntry::new($index, stringify!($isr), $isr)),+],
            );

        const _: () = $name.assert_covers($table.len());
    };
}
