//! Descriptor tables
//!
//! Table position is the device index used by drivers and ISR bindings:
//! `UARTS` index 0 is USART3, the one routed to the debug header.

use boardconf_core::DescriptorTable;
use boardconf_hal::{
    AltFunction, ClockGate, I2cDescriptor, Pin, PinMode, Port, SpiDescriptor, TimerDescriptor,
    UartDescriptor, Vector,
};
use boardconf_hal_stm32l1::map;

const TIMER_ENTRIES: [TimerDescriptor; 1] = [TimerDescriptor {
    instance: map::TIM5.instance,
    clock: ClockGate::apb1(1 << 3),
    vector: Vector(46),
}];

const UART_ENTRIES: [UartDescriptor; 2] = [
    UartDescriptor {
        instance: map::USART3.instance,
        clock: ClockGate::apb1(1 << 18),
        rx: Pin::new(Port::C, 11),
        tx: Pin::new(Port::C, 10),
        rx_af: AltFunction::AF7,
        tx_af: AltFunction::AF7,
        vector: Vector(39),
    },
    UartDescriptor {
        instance: map::USART1.instance,
        clock: ClockGate::apb2(1 << 14),
        rx: Pin::new(Port::A, 10),
        tx: Pin::new(Port::A, 9),
        rx_af: AltFunction::AF7,
        tx_af: AltFunction::AF7,
        vector: Vector(37),
    },
];

const SPI_ENTRIES: [SpiDescriptor; 2] = [
    // OLED display, external pins
    SpiDescriptor {
        instance: map::SPI1.instance,
        clock: ClockGate::apb2(1 << 12),
        vector: Vector(35),
        port: Port::A,
        port_clock: ClockGate::ahb(1 << 0),
        sck: 5,
        mosi: 7,
        miso: 6,
        af: AltFunction::AF5,
    },
    // AT45DB641E data flash
    SpiDescriptor {
        instance: map::SPI3.instance,
        clock: ClockGate::apb1(1 << 15),
        vector: Vector(47),
        port: Port::B,
        port_clock: ClockGate::ahb(1 << 1),
        sck: 3,
        mosi: 5,
        miso: 4,
        af: AltFunction::AF6,
    },
];

const I2C_ENTRIES: [I2cDescriptor; 2] = [
    I2cDescriptor {
        instance: map::I2C1.instance,
        clock: ClockGate::apb1(1 << 21),
        scl: Pin::new(Port::B, 8),
        sda: Pin::new(Port::B, 9),
        mode: PinMode::OpenDrainPullUp,
        af: AltFunction::AF4,
        error_vector: Vector(32),
        event_vector: Vector(31),
    },
    I2cDescriptor {
        instance: map::I2C2.instance,
        clock: ClockGate::apb1(1 << 22),
        scl: Pin::new(Port::B, 10),
        sda: Pin::new(Port::B, 11),
        mode: PinMode::OpenDrainPullUp,
        af: AltFunction::AF4,
        error_vector: Vector(34),
        event_vector: Vector(33),
    },
];

pub const TIMERS: DescriptorTable<TimerDescriptor, 1> = DescriptorTable::timers(&TIMER_ENTRIES);
pub const UARTS: DescriptorTable<UartDescriptor, 2> = DescriptorTable::uarts(&UART_ENTRIES);
pub const SPIS: DescriptorTable<SpiDescriptor, 2> = DescriptorTable::spis(&SPI_ENTRIES);
pub const I2CS: DescriptorTable<I2cDescriptor, 2> = DescriptorTable::i2cs(&I2C_ENTRIES);

// Chip legality
const _: () = boardconf_hal_stm32l1::check::assert_timers(TIMERS.as_slice());
const _: () = boardconf_hal_stm32l1::check::assert_uarts(UARTS.as_slice());
const _: () = boardconf_hal_stm32l1::check::assert_spis(SPIS.as_slice());
const _: () = boardconf_hal_stm32l1::check::assert_i2cs(I2CS.as_slice());

#[cfg(test)]
mod tests {
    use super::*;
    use boardconf_hal::{Bus, DescriptorError};

    #[test]
    fn test_counts() {
        assert_eq!(TIMERS.len(), 1);
        assert_eq!(UARTS.len(), 2);
        assert_eq!(SPIS.len(), 2);
        assert_eq!(I2CS.len(), 2);
    }

    #[test]
    fn test_uart_buses() {
        assert_eq!(UARTS.at::<0>().instance.name, "USART3");
        assert_eq!(UARTS.at::<0>().bus(), Bus::Apb1);
        assert_eq!(UARTS.at::<1>().instance.name, "USART1");
        assert_eq!(UARTS.at::<1>().bus(), Bus::Apb2);
    }

    #[test]
    fn test_spi_pins_on_declared_port() {
        for (_, spi) in SPIS.iter() {
            for pin in spi.pins() {
                assert_eq!(pin.port, spi.port);
            }
        }
        assert_eq!(SPIS.at::<1>().sck(), Pin::new(Port::B, 3));
    }

    #[test]
    fn test_i2c_scl_equal_sda_rejected() {
        let broken = I2cDescriptor {
            sda: Pin::new(Port::B, 8),
            ..*I2CS.at::<0>()
        };
        assert_eq!(broken.checked(), Err(DescriptorError::PinAlias));
    }

    #[test]
    fn test_chip_rejects_wrong_alternate_function() {
        let mut spi = *SPIS.at::<1>();
        spi.af = AltFunction::AF5;
        assert_eq!(
            boardconf_hal_stm32l1::check::spi(&spi),
            Err(DescriptorError::AltFunctionUnavailable)
        );
    }
}
