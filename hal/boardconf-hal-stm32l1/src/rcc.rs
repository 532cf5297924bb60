//! Reset and clock control
//!
//! Bus clock gating for [`ClockControl`] plus clock-tree setup. Only the
//! HSI-fed PLL is supported as the system clock source.

use boardconf_hal::{Bus, BusClocks, ClockControl, ClockGate, ClockTree, HalError};

use crate::map::{self, FLASH_BASE, PWR_BASE, RCC_BASE};
use crate::mmio::Mmio;
use crate::Stm32l1;

// RCC register offsets
pub const CR: u32 = 0x00;
pub const CFGR: u32 = 0x08;
pub const AHBENR: u32 = 0x1C;
pub const APB2ENR: u32 = 0x20;
pub const APB1ENR: u32 = 0x24;

pub const CR_HSION: u32 = 1 << 0;
pub const CR_HSIRDY: u32 = 1 << 1;
pub const CR_PLLON: u32 = 1 << 24;
pub const CR_PLLRDY: u32 = 1 << 25;

const CFGR_SW_HSI: u32 = 0b01;
const CFGR_SW_PLL: u32 = 0b11;
const CFGR_SWS_SHIFT: u32 = 2;

// FLASH_ACR
const ACR: u32 = 0x00;
const ACR_LATENCY: u32 = 1 << 0;
const ACR_PRFTEN: u32 = 1 << 1;
const ACR_ACC64: u32 = 1 << 2;

// PWR
const PWR_CR: u32 = 0x00;
const PWR_CSR: u32 = 0x04;
const PWR_CSR_VOSF: u32 = 1 << 4;
/// Voltage range 1 (1.8 V), required above 16 MHz
const VOS_RANGE1: u32 = 0b01;

/// HSI oscillator frequency
pub const HSI_HZ: u32 = 16_000_000;

/// Highest core clock in voltage range 1
pub const MAX_CORE_HZ: u32 = 32_000_000;

/// Highest PLL VCO frequency in voltage range 1
const MAX_VCO_HZ: u32 = 96_000_000;

/// Polls of a ready flag before giving up
pub const READY_SPINS: u32 = 10_000;

/// Enable register of a bus
pub const fn enable_register(bus: Bus) -> u32 {
    RCC_BASE
        + match bus {
            Bus::Ahb => AHBENR,
            Bus::Apb1 => APB1ENR,
            Bus::Apb2 => APB2ENR,
        }
}

const fn ahb_prescaler(div: u32) -> Option<u32> {
    match div {
        1 => Some(0b0000),
        2 => Some(0b1000),
        4 => Some(0b1001),
        8 => Some(0b1010),
        16 => Some(0b1011),
        64 => Some(0b1100),
        128 => Some(0b1101),
        256 => Some(0b1110),
        512 => Some(0b1111),
        _ => None,
    }
}

const fn apb_prescaler(div: u32) -> Option<u32> {
    match div {
        1 => Some(0b000),
        2 => Some(0b100),
        4 => Some(0b101),
        8 => Some(0b110),
        16 => Some(0b111),
        _ => None,
    }
}

const fn pll_mul(mul: u32) -> Option<u32> {
    match mul {
        3 => Some(0),
        4 => Some(1),
        6 => Some(2),
        8 => Some(3),
        12 => Some(4),
        16 => Some(5),
        24 => Some(6),
        32 => Some(7),
        48 => Some(8),
        _ => None,
    }
}

const fn pll_div(div: u32) -> Option<u32> {
    match div {
        2 => Some(1),
        3 => Some(2),
        4 => Some(3),
        _ => None,
    }
}

/// RCC_CFGR value selecting the PLL for a clock tree
///
/// `None` when the tree cannot be built on this chip: a source other
/// than HSI, a multiplier, divider or prescaler with no encoding, a VCO
/// or core clock above the range-1 limits, or too few flash wait states.
pub const fn cfgr_bits(tree: &ClockTree) -> Option<u32> {
    if tree.source_hz != HSI_HZ {
        return None;
    }
    let (Some(mul), Some(div)) = (pll_mul(tree.pll_mul), pll_div(tree.pll_div)) else {
        return None;
    };
    let (Some(hpre), Some(ppre1), Some(ppre2)) = (
        ahb_prescaler(tree.ahb_div),
        apb_prescaler(tree.apb1_div),
        apb_prescaler(tree.apb2_div),
    ) else {
        return None;
    };
    if tree.source_hz as u64 * tree.pll_mul as u64 > MAX_VCO_HZ as u64 {
        return None;
    }
    let core = tree.core_clock();
    if core > MAX_CORE_HZ || tree.flash_latency > 1 {
        return None;
    }
    if core > HSI_HZ && tree.flash_latency == 0 {
        return None;
    }
    Some(CFGR_SW_PLL | hpre << 4 | ppre1 << 8 | ppre2 << 11 | mul << 18 | div << 22)
}

impl<R: Mmio> Stm32l1<R> {
    fn wait(&self, addr: u32, mask: u32, expected: u32) -> Result<(), HalError> {
        for _ in 0..READY_SPINS {
            if self.regs.read(addr) & mask == expected {
                return Ok(());
            }
        }
        Err(HalError::ClockNotReady)
    }

    fn switch_to(&mut self, sw: u32) -> Result<(), HalError> {
        self.regs.write_field(RCC_BASE + CFGR, 0, 2, sw);
        self.wait(RCC_BASE + CFGR, 0b11 << CFGR_SWS_SHIFT, sw << CFGR_SWS_SHIFT)
    }

    /// Program the clock tree and switch the core to the PLL
    ///
    /// Raises the core voltage and flash wait states before the frequency
    /// goes up. Returns the resulting bus frequencies.
    pub fn apply_clock_tree(&mut self, tree: &ClockTree) -> Result<BusClocks, HalError> {
        let cfgr = cfgr_bits(tree).ok_or(HalError::UnsupportedClockTree)?;

        self.enable(map::PWR_CLOCK)?;
        self.regs.write_field(PWR_BASE + PWR_CR, 11, 2, VOS_RANGE1);
        self.wait(PWR_BASE + PWR_CSR, PWR_CSR_VOSF, 0)?;

        // 64-bit access must be on before prefetch or wait states
        self.regs.set_bits(FLASH_BASE + ACR, ACR_ACC64);
        self.regs.set_bits(FLASH_BASE + ACR, ACR_PRFTEN);
        if tree.flash_latency == 1 {
            self.regs.set_bits(FLASH_BASE + ACR, ACR_LATENCY);
        }

        self.regs.set_bits(RCC_BASE + CR, CR_HSION);
        self.wait(RCC_BASE + CR, CR_HSIRDY, CR_HSIRDY)?;
        self.switch_to(CFGR_SW_HSI)?;

        self.regs.clear_bits(RCC_BASE + CR, CR_PLLON);
        self.wait(RCC_BASE + CR, CR_PLLRDY, 0)?;
        self.regs
            .write(RCC_BASE + CFGR, (cfgr & !0b11) | CFGR_SW_HSI | CFGR_SW_HSI << CFGR_SWS_SHIFT);
        self.regs.set_bits(RCC_BASE + CR, CR_PLLON);
        self.wait(RCC_BASE + CR, CR_PLLRDY, CR_PLLRDY)?;

        self.switch_to(CFGR_SW_PLL)?;

        let clocks = tree.bus_clocks();
        info!(
            "clock tree up: core {} Hz, apb1 {} Hz, apb2 {} Hz",
            clocks.core,
            clocks.apb1,
            clocks.apb2
        );
        Ok(clocks)
    }
}

impl<R: Mmio> ClockControl for Stm32l1<R> {
    fn enable(&mut self, gate: ClockGate) -> Result<(), HalError> {
        let addr = enable_register(gate.bus);
        let current = self.regs.read(addr);
        if current & gate.mask == gate.mask {
            return Ok(());
        }
        self.regs.write(addr, current | gate.mask);
        if self.regs.read(addr) & gate.mask != gate.mask {
            warn!("clock gate {:?} {:x} did not latch", gate.bus, gate.mask);
            return Err(HalError::ClockNotReady);
        }
        trace!("clock on: {:?} {:x}", gate.bus, gate.mask);
        Ok(())
    }

    fn disable(&mut self, gate: ClockGate) -> Result<(), HalError> {
        let addr = enable_register(gate.bus);
        let current = self.regs.read(addr);
        if current & gate.mask != 0 {
            self.regs.write(addr, current & !gate.mask);
        }
        Ok(())
    }

    fn is_enabled(&self, gate: ClockGate) -> bool {
        self.regs.read(enable_register(gate.bus)) & gate.mask == gate.mask
    }
}
