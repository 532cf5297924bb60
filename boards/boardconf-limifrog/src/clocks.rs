//! Clock system of the board
//!
//! The internal 16 MHz oscillator feeds the PLL: `16 MHz / 2 * 4 = 32 MHz`,
//! the highest core clock voltage range 1 allows. AHB and both APB buses
//! run undivided, so every peripheral sees 32 MHz.

use boardconf_hal::{BusClocks, ClockTree};
use boardconf_hal_stm32l1::rcc;

/// Internal oscillator
pub const CLOCK_HSI: u32 = rcc::HSI_HZ;

/// Target core clock
pub const CLOCK_CORECLOCK: u32 = 32_000_000;

pub const CLOCK_TREE: ClockTree = ClockTree {
    source_hz: CLOCK_HSI,
    pll_div: 2,
    pll_mul: 4,
    ahb_div: 1,
    apb1_div: 1,
    apb2_div: 1,
    // One wait state above 16 MHz
    flash_latency: 1,
};

/// Bus frequencies after [`CLOCK_TREE`] is applied
pub const BUS_CLOCKS: BusClocks = CLOCK_TREE.bus_clocks();

pub const CLOCK_AHB: u32 = BUS_CLOCKS.ahb;
pub const CLOCK_APB1: u32 = BUS_CLOCKS.apb1;
pub const CLOCK_APB2: u32 = BUS_CLOCKS.apb2;

const _: () = assert!(
    CLOCK_TREE.core_clock() == CLOCK_CORECLOCK,
    "PLL settings do not produce the core clock"
);
const _: () = assert!(
    rcc::cfgr_bits(&CLOCK_TREE).is_some(),
    "clock tree not supported by the RCC"
);

#[cfg(test)]
mod tests {
    use super::*;
    use boardconf_hal::Bus;

    #[test]
    fn test_all_buses_at_core_clock() {
        assert_eq!(BUS_CLOCKS.core, 32_000_000);
        assert_eq!(BUS_CLOCKS.frequency(Bus::Ahb), 32_000_000);
        assert_eq!(BUS_CLOCKS.frequency(Bus::Apb1), 32_000_000);
        assert_eq!(BUS_CLOCKS.frequency(Bus::Apb2), 32_000_000);
        assert_eq!(BUS_CLOCKS.timer_frequency(Bus::Apb1), 32_000_000);
        assert_eq!([CLOCK_AHB, CLOCK_APB1, CLOCK_APB2], [CLOCK_CORECLOCK; 3]);
    }
}
