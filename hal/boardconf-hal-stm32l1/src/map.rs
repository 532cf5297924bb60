//! STM32L1 memory map, clock gates and interrupt numbers
//!
//! Values are for the category 3 devices (STM32L151xC / STM32L152xC),
//! which carry every instance listed here.

use boardconf_hal::{ClockGate, Instance, Port, Vector};

/// Number of external interrupt vectors
pub const IRQ_COUNT: usize = 57;

/// Implemented NVIC priority bits
pub const PRIORITY_BITS: u8 = 4;

// System blocks
pub const RCC_BASE: u32 = 0x4002_3800;
pub const FLASH_BASE: u32 = 0x4002_3C00;
pub const PWR_BASE: u32 = 0x4000_7000;
pub const NVIC_ISER: u32 = 0xE000_E100;
pub const NVIC_ICER: u32 = 0xE000_E180;
pub const NVIC_IPR: u32 = 0xE000_E400;

/// Peripheral class of an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Kind {
    Timer,
    Usart,
    Spi,
    I2c,
}

/// What the chip says about one instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InstanceInfo {
    pub instance: Instance,
    pub kind: Kind,
    pub clock: ClockGate,
    /// Global vector, or the event vector for I2C
    pub vector: Vector,
    /// I2C error vector
    pub error_vector: Option<Vector>,
}

macro_rules! instance {
    ($name:ident, $kind:ident, $base:expr, $gate:expr, $irq:expr) => {
        pub const $name: InstanceInfo = InstanceInfo {
            instance: Instance::new(stringify!($name), $base),
            kind: Kind::$kind,
            clock: $gate,
            vector: Vector($irq),
            error_vector: None,
        };
    };
    ($name:ident, $kind:ident, $base:expr, $gate:expr, $ev:expr, $er:expr) => {
        pub const $name: InstanceInfo = InstanceInfo {
            instance: Instance::new(stringify!($name), $base),
            kind: Kind::$kind,
            clock: $gate,
            vector: Vector($ev),
            error_vector: Some(Vector($er)),
        };
    };
}

// APB1
instance!(TIM2, Timer, 0x4000_0000, ClockGate::apb1(1 << 0), 28);
instance!(TIM3, Timer, 0x4000_0400, ClockGate::apb1(1 << 1), 29);
instance!(TIM4, Timer, 0x4000_0800, ClockGate::apb1(1 << 2), 30);
instance!(TIM5, Timer, 0x4000_0C00, ClockGate::apb1(1 << 3), 46);
instance!(TIM6, Timer, 0x4000_1000, ClockGate::apb1(1 << 4), 43);
instance!(TIM7, Timer, 0x4000_1400, ClockGate::apb1(1 << 5), 44);
instance!(SPI2, Spi, 0x4000_3800, ClockGate::apb1(1 << 14), 36);
instance!(SPI3, Spi, 0x4000_3C00, ClockGate::apb1(1 << 15), 47);
instance!(USART2, Usart, 0x4000_4400, ClockGate::apb1(1 << 17), 38);
instance!(USART3, Usart, 0x4000_4800, ClockGate::apb1(1 << 18), 39);
instance!(UART4, Usart, 0x4000_4C00, ClockGate::apb1(1 << 19), 48);
instance!(UART5, Usart, 0x4000_5000, ClockGate::apb1(1 << 20), 49);
instance!(I2C1, I2c, 0x4000_5400, ClockGate::apb1(1 << 21), 31, 32);
instance!(I2C2, I2c, 0x4000_5800, ClockGate::apb1(1 << 22), 33, 34);

// APB2
instance!(TIM9, Timer, 0x4001_0800, ClockGate::apb2(1 << 2), 25);
instance!(TIM10, Timer, 0x4001_0C00, ClockGate::apb2(1 << 3), 26);
instance!(TIM11, Timer, 0x4001_1000, ClockGate::apb2(1 << 4), 27);
instance!(SPI1, Spi, 0x4001_3000, ClockGate::apb2(1 << 12), 35);
instance!(USART1, Usart, 0x4001_3800, ClockGate::apb2(1 << 14), 37);

/// Power interface clock
pub const PWR_CLOCK: ClockGate = ClockGate::apb1(1 << 28);

/// Every instance with a descriptor schema
pub const INSTANCES: [InstanceInfo; 19] = [
    TIM2, TIM3, TIM4, TIM5, TIM6, TIM7, SPI2, SPI3, USART2, USART3, UART4, UART5, I2C1, I2C2, TIM9,
    TIM10, TIM11, SPI1, USART1,
];

/// Look an instance up by register base
pub const fn lookup(base: u32) -> Option<InstanceInfo> {
    let mut i = 0;
    while i < INSTANCES.len() {
        if INSTANCES[i].instance.base == base {
            return Some(INSTANCES[i]);
        }
        i += 1;
    }
    None
}

/// Slot of a GPIO port in the AHB enable register and the GPIO address map
///
/// Port H sits between E and F on this family.
pub const fn port_slot(port: Port) -> u32 {
    match port {
        Port::A => 0,
        Port::B => 1,
        Port::C => 2,
        Port::D => 3,
        Port::E => 4,
        Port::H => 5,
        Port::F => 6,
        Port::G => 7,
    }
}

/// Register base of a GPIO port
pub const fn gpio_base(port: Port) -> u32 {
    0x4002_0000 + 0x400 * port_slot(port)
}

/// Clock gate of a GPIO port
pub const fn port_gate(port: Port) -> ClockGate {
    ClockGate::ahb(1 << port_slot(port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_base() {
        assert_eq!(lookup(0x4000_4800), Some(USART3));
        assert_eq!(lookup(0x4000_4800).map(|i| i.instance.name), Some("USART3"));
        assert_eq!(lookup(0x4000_0001), None);
    }

    #[test]
    fn test_vectors_unique_and_in_range() {
        let mut seen = [false; IRQ_COUNT];
        for info in INSTANCES {
            for v in [Some(info.vector), info.error_vector].into_iter().flatten() {
                assert!(v.index() < IRQ_COUNT);
                assert!(!seen[v.index()], "vector {} reused", v.0);
                seen[v.index()] = true;
            }
        }
    }

    #[test]
    fn test_port_h_layout() {
        assert_eq!(gpio_base(Port::A), 0x4002_0000);
        assert_eq!(gpio_base(Port::H), 0x4002_1400);
        assert_eq!(port_gate(Port::H), ClockGate::ahb(1 << 5));
        assert_eq!(port_gate(Port::G), ClockGate::ahb(1 << 7));
    }
}
