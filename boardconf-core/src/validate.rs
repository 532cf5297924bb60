//! Descriptor table validation
//!
//! The per-class checks are `const fn` so tables can be validated while
//! they are being built; [`validate_board`] runs the same checks at
//! runtime over a whole [`Board`] and collects every error it finds.

use boardconf_hal::{I2cDescriptor, SpiDescriptor, TimerDescriptor, UartDescriptor};
use heapless::Vec;

use crate::binding::IsrEntry;
use crate::board::Board;
use crate::class::{Line, PeripheralClass};
use crate::error::{ConfigError, ConfigFault};

/// Maximum number of errors [`validate_board`] reports
pub const MAX_REPORTED: usize = 8;

/// Validate a timer table
pub const fn timers(entries: &[TimerDescriptor]) -> Result<(), ConfigError> {
    let mut i = 0;
    while i < entries.len() {
        if let Err(e) = entries[i].validate() {
            return Err(ConfigError::descriptor(PeripheralClass::Timer, i, e));
        }
        let mut j = 0;
        while j < i {
            if entries[j].vector.same_as(entries[i].vector) {
                return Err(duplicate(PeripheralClass::Timer, i));
            }
            j += 1;
        }
        i += 1;
    }
    Ok(())
}

/// Validate a UART table
pub const fn uarts(entries: &[UartDescriptor]) -> Result<(), ConfigError> {
    let mut i = 0;
    while i < entries.len() {
        if let Err(e) = entries[i].validate() {
            return Err(ConfigError::descriptor(PeripheralClass::Uart, i, e));
        }
        let mut j = 0;
        while j < i {
            if entries[j].vector.same_as(entries[i].vector) {
                return Err(duplicate(PeripheralClass::Uart, i));
            }
            j += 1;
        }
        i += 1;
    }
    Ok(())
}

/// Validate a SPI table
pub const fn spis(entries: &[SpiDescriptor]) -> Result<(), ConfigError> {
    let mut i = 0;
    while i < entries.len() {
        if let Err(e) = entries[i].validate() {
            return Err(ConfigError::descriptor(PeripheralClass::Spi, i, e));
        }
        let mut j = 0;
        while j < i {
            if entries[j].vector.same_as(entries[i].vector) {
                return Err(duplicate(PeripheralClass::Spi, i));
            }
            j += 1;
        }
        i += 1;
    }
    Ok(())
}

/// Validate an I2C table
///
/// Event and error vectors of all entries must be pairwise distinct.
pub const fn i2cs(entries: &[I2cDescriptor]) -> Result<(), ConfigError> {
    let mut i = 0;
    while i < entries.len() {
        if let Err(e) = entries[i].validate() {
            return Err(ConfigError::descriptor(PeripheralClass::I2c, i, e));
        }
        let mut j = 0;
        while j < i {
            let a = entries[j].vectors();
            let b = entries[i].vectors();
            if a[0].same_as(b[0]) || a[0].same_as(b[1]) || a[1].same_as(b[0]) || a[1].same_as(b[1])
            {
                return Err(duplicate(PeripheralClass::I2c, i));
            }
            j += 1;
        }
        i += 1;
    }
    Ok(())
}

const fn duplicate(class: PeripheralClass, index: usize) -> ConfigError {
    ConfigError::new(class, index, ConfigFault::DuplicateVector)
}

/// Validate a whole board, collecting every error
///
/// Besides the per-class checks this catches one vector claimed by two
/// classes. At most [`MAX_REPORTED`] errors are returned.
pub fn validate_board(board: &Board) -> Result<(), Vec<ConfigError, MAX_REPORTED>> {
    let mut errors: Vec<ConfigError, MAX_REPORTED> = Vec::new();

    let per_class = [
        timers(board.timers),
        uarts(board.uarts),
        spis(board.spis),
        i2cs(board.i2cs),
    ];
    for e in per_class.into_iter().filter_map(Result::err) {
        report(&mut errors, e);
    }

    for (k, (class, index, vector)) in board.vectors().enumerate() {
        let claimed = board
            .vectors()
            .take(k)
            .any(|(_, _, earlier)| earlier.same_as(vector));
        if claimed {
            report(&mut errors, duplicate(class, index));
        }
    }

    finish(board.name, errors)
}

/// Validate the ISR bindings of a board by entry-function address
///
/// No entry function may serve two slots, within one line or across
/// lines. At most [`MAX_REPORTED`] errors are returned.
pub fn validate_bindings(
    name: &str,
    bindings: &[(Line, &[IsrEntry])],
) -> Result<(), Vec<ConfigError, MAX_REPORTED>> {
    let mut errors: Vec<ConfigError, MAX_REPORTED> = Vec::new();

    for (n, (line, entries)) in bindings.iter().enumerate() {
        for (i, entry) in entries.iter().enumerate() {
            let shared = entries[..i]
                .iter()
                .chain(bindings[..n].iter().flat_map(|(_, e)| e.iter()))
                .any(|e| e.same_handler(entry));
            if shared {
                report(
                    &mut errors,
                    ConfigError::new(line.class(), i, ConfigFault::DuplicateHandler),
                );
            }
        }
    }

    finish(name, errors)
}

fn report(errors: &mut Vec<ConfigError, MAX_REPORTED>, e: ConfigError) {
    if errors.contains(&e) {
        return;
    }
    if errors.push(e).is_err() {
        warn!("more than {} config errors, dropping: {}", MAX_REPORTED, e);
    }
}

fn finish(
    name: &str,
    errors: Vec<ConfigError, MAX_REPORTED>,
) -> Result<(), Vec<ConfigError, MAX_REPORTED>> {
    if errors.is_empty() {
        Ok(())
    } else {
        for e in errors.iter() {
            error!("board {}: invalid config: {}", name, e);
        }
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Priorities;
    use boardconf_hal::{
        AltFunction, BusClocks, ClockGate, DescriptorError, Instance, Pin, PinMode, Port, Vector,
    };
    use proptest::prelude::*;

    fn uart(rx: u8, tx: u8, vector: u16) -> UartDescriptor {
        UartDescriptor {
            instance: Instance::new("USART1", 0x4001_3800),
            clock: ClockGate::apb2(1 << 14),
            rx: Pin::new(Port::A, rx),
            tx: Pin::new(Port::A, tx),
            rx_af: AltFunction::AF7,
            tx_af: AltFunction::AF7,
            vector: Vector(vector),
        }
    }

    fn i2c(scl: u8, sda: u8, ev: u16, er: u16) -> I2cDescriptor {
        I2cDescriptor {
            instance: Instance::new("I2C1", 0x4000_5400),
            clock: ClockGate::apb1(1 << 21),
            scl: Pin::new(Port::B, scl),
            sda: Pin::new(Port::B, sda),
            mode: PinMode::OpenDrainPullUp,
            af: AltFunction::AF4,
            error_vector: Vector(er),
            event_vector: Vector(ev),
        }
    }

    fn spi(sck: u8, mosi: u8, miso: u8) -> SpiDescriptor {
        SpiDescriptor {
            instance: Instance::new("SPI1", 0x4001_3000),
            clock: ClockGate::apb2(1 << 12),
            vector: Vector(35),
            port: Port::A,
            port_clock: ClockGate::ahb(1),
            sck,
            mosi,
            miso,
            af: AltFunction::AF5,
        }
    }

    const CLOCKS: BusClocks = BusClocks {
        core: 32_000_000,
        ahb: 32_000_000,
        apb1: 32_000_000,
        apb2: 32_000_000,
        apb1_timer: 32_000_000,
        apb2_timer: 32_000_000,
    };

    #[test]
    fn test_duplicate_uart_vector() {
        let table = [uart(10, 9, 37), uart(11, 12, 37)];
        let err = uarts(&table).unwrap_err();
        assert_eq!(err.class, PeripheralClass::Uart);
        assert_eq!(err.index, 1);
        assert_eq!(err.fault, ConfigFault::DuplicateVector);
    }

    #[test]
    fn test_i2c_scl_sda_alias_located() {
        let table = [i2c(8, 9, 31, 32), i2c(10, 10, 33, 34)];
        let err = i2cs(&table).unwrap_err();
        assert_eq!(
            err,
            ConfigError::descriptor(PeripheralClass::I2c, 1, DescriptorError::PinAlias)
        );
    }

    #[test]
    fn test_i2c_cross_entry_vector_clash() {
        let table = [i2c(8, 9, 31, 32), i2c(10, 11, 32, 34)];
        assert_eq!(
            i2cs(&table).unwrap_err().fault,
            ConfigFault::DuplicateVector
        );
    }

    #[test]
    fn test_board_cross_class_vector_clash() {
        static UARTS: [UartDescriptor; 1] = [UartDescriptor {
            instance: Instance::new("USART1", 0x4001_3800),
            clock: ClockGate::apb2(1 << 14),
            rx: Pin::new(Port::A, 10),
            tx: Pin::new(Port::A, 9),
            rx_af: AltFunction::AF7,
            tx_af: AltFunction::AF7,
            vector: Vector(35),
        }];
        static SPIS: [SpiDescriptor; 1] = [SpiDescriptor {
            instance: Instance::new("SPI1", 0x4001_3000),
            clock: ClockGate::apb2(1 << 12),
            vector: Vector(35),
            port: Port::A,
            port_clock: ClockGate::ahb(1),
            sck: 5,
            mosi: 7,
            miso: 6,
            af: AltFunction::AF5,
        }];
        let board = Board {
            name: "clash",
            clocks: CLOCKS,
            priorities: Priorities::default(),
            timers: &[],
            uarts: &UARTS,
            spis: &SPIS,
            i2cs: &[],
        };
        let errors = validate_board(&board).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].class, PeripheralClass::Spi);
        assert_eq!(errors[0].fault, ConfigFault::DuplicateVector);
    }

    #[test]
    fn test_empty_board_is_valid() {
        let board = Board {
            name: "empty",
            clocks: CLOCKS,
            priorities: Priorities::default(),
            timers: &[],
            uarts: &[],
            spis: &[],
            i2cs: &[],
        };
        assert!(validate_board(&board).is_ok());
    }

    const fn many_timers<const N: usize>() -> [TimerDescriptor; N] {
        let mut table = [TimerDescriptor {
            instance: Instance::new("TIM2", 0x4000_0000),
            clock: ClockGate::apb1(1),
            vector: Vector(0),
        }; N];
        let mut i = 0;
        while i < N {
            table[i].vector = Vector(i as u16);
            i += 1;
        }
        table
    }

    #[test]
    fn test_cross_class_clash_past_many_vectors() {
        static TIMERS: [TimerDescriptor; 80] = many_timers();
        static UARTS: [UartDescriptor; 1] = [UartDescriptor {
            instance: Instance::new("USART1", 0x4001_3800),
            clock: ClockGate::apb2(1 << 14),
            rx: Pin::new(Port::A, 10),
            tx: Pin::new(Port::A, 9),
            rx_af: AltFunction::AF7,
            tx_af: AltFunction::AF7,
            vector: Vector(79),
        }];
        let board = Board {
            name: "wide",
            clocks: CLOCKS,
            priorities: Priorities::default(),
            timers: &TIMERS,
            uarts: &UARTS,
            spis: &[],
            i2cs: &[],
        };
        let errors = validate_board(&board).unwrap_err();
        assert_eq!(
            errors.as_slice(),
            &[ConfigError::new(PeripheralClass::Uart, 0, ConfigFault::DuplicateVector)]
        );
    }

    #[test]
    fn test_error_report_is_capped() {
        const fn same_vector<const N: usize>() -> [TimerDescriptor; N] {
            let mut table = many_timers::<N>();
            let mut i = 0;
            while i < N {
                table[i].vector = Vector(0);
                i += 1;
            }
            table
        }
        static TIMERS: [TimerDescriptor; 12] = same_vector();
        let board = Board {
            name: "crowded",
            clocks: CLOCKS,
            priorities: Priorities::default(),
            timers: &TIMERS,
            uarts: &[],
            spis: &[],
            i2cs: &[],
        };
        let errors = validate_board(&board).unwrap_err();
        assert_eq!(errors.len(), MAX_REPORTED);
        assert_eq!(errors[0].index, 1);
        assert!(errors.iter().all(|e| e.fault == ConfigFault::DuplicateVector));
    }

    extern "C" fn isr_a() {}
    extern "C" fn isr_b() {
        let _ = core::hint::black_box(1);
    }

    #[test]
    fn test_bindings_with_distinct_handlers() {
        let uart: &[IsrEntry] = &[IsrEntry::new(0, "isr_a", isr_a)];
        let spi: &[IsrEntry] = &[IsrEntry::new(0, "isr_b", isr_b)];
        assert!(validate_bindings("ok", &[(Line::Uart, uart), (Line::Spi, spi)]).is_ok());
    }

    #[test]
    fn test_bindings_reject_shared_handler() {
        let uart: &[IsrEntry] = &[
            IsrEntry::new(0, "isr_a", isr_a),
            IsrEntry::new(1, "isr_b", isr_b),
        ];
        let spi: &[IsrEntry] = &[IsrEntry::new(0, "isr_spi", isr_a)];
        let errors =
            validate_bindings("shared", &[(Line::Uart, uart), (Line::Spi, spi)]).unwrap_err();
        assert_eq!(
            errors.as_slice(),
            &[ConfigError::new(PeripheralClass::Spi, 0, ConfigFault::DuplicateHandler)]
        );
    }

    #[test]
    fn test_bindings_reject_renamed_handler() {
        let timer: &[IsrEntry] = &[
            IsrEntry::new(0, "isr_x", isr_b),
            IsrEntry::new(1, "isr_y", isr_b),
        ];
        let errors = validate_bindings("renamed", &[(Line::Timer, timer)]).unwrap_err();
        assert_eq!(
            errors.as_slice(),
            &[ConfigError::new(PeripheralClass::Timer, 1, ConfigFault::DuplicateHandler)]
        );
    }

    proptest! {
        #[test]
        fn prop_spi_aliasing_detected(sck in 0u8..16, mosi in 0u8..16, miso in 0u8..16) {
            let aliased = sck == mosi || sck == miso || mosi == miso;
            let result = spis(&[spi(sck, mosi, miso)]);
            prop_assert_eq!(result.is_err(), aliased);
            if !aliased {
                for pin in spi(sck, mosi, miso).pins() {
                    prop_assert_eq!(pin.port, Port::A);
                }
            }
        }

        #[test]
        fn prop_i2c_accepts_only_distinct_pins(scl in 0u8..16, sda in 0u8..16) {
            let result = i2cs(&[i2c(scl, sda, 31, 32)]);
            if scl == sda {
                prop_assert_eq!(
                    result,
                    Err(ConfigError::descriptor(PeripheralClass::I2c, 0, DescriptorError::PinAlias))
                );
            } else {
                prop_assert!(result.is_ok());
            }
        }

        #[test]
        fn prop_uart_vectors_must_be_unique(a in 0u16..64, b in 0u16..64) {
            let table = [uart(10, 9, a), uart(3, 2, b)];
            prop_assert_eq!(uarts(&table).is_ok(), a != b);
        }
    }
}
