//! Register access
//!
//! Everything in this crate touches hardware through [`Mmio`], so the
//! clock, pin and interrupt logic can run on the host against a simulated
//! register file.

/// 32-bit register access by absolute address
pub trait Mmio {
    fn read(&self, addr: u32) -> u32;

    fn write(&mut self, addr: u32, value: u32);

    /// Read-modify-write
    fn modify(&mut self, addr: u32, f: impl FnOnce(u32) -> u32) {
        let value = self.read(addr);
        self.write(addr, f(value));
    }

    /// Set bits
    fn set_bits(&mut self, addr: u32, mask: u32) {
        self.modify(addr, |v| v | mask);
    }

    /// Clear bits
    fn clear_bits(&mut self, addr: u32, mask: u32) {
        self.modify(addr, |v| v & !mask);
    }

    /// Replace the `width`-bit field at `shift`
    fn write_field(&mut self, addr: u32, shift: u32, width: u32, value: u32) {
        let mask = ((1u32 << width) - 1) << shift;
        self.modify(addr, |v| (v & !mask) | ((value << shift) & mask));
    }
}

/// Volatile access to the real memory map
#[derive(Debug)]
pub struct Hardware {
    _private: (),
}

impl Hardware {
    /// Only [`Stm32l1::take`](crate::Stm32l1::take) hands these out
    pub(crate) fn new() -> Self {
        Self { _private: () }
    }
}

#[allow(unsafe_code)]
impl Mmio for Hardware {
    fn read(&self, addr: u32) -> u32 {
        // SAFETY: only peripheral register addresses from `map` reach here
        unsafe { core::ptr::read_volatile(addr as usize as *const u32) }
    }

    fn write(&mut self, addr: u32, value: u32) {
        // SAFETY: as above; the chip is claimed once
        unsafe { core::ptr::write_volatile(addr as usize as *mut u32, value) }
    }
}

/// Host-side register file with just enough hardware behavior for the
/// clock, pin and NVIC code: ready flags follow their enable bits, the
/// clock switch status follows the switch request, and NVIC set/clear
/// registers act on one enable word.
#[cfg(test)]
pub mod sim {
    use heapless::FnvIndexMap;

    use super::Mmio;
    use crate::map::{NVIC_ICER, NVIC_ISER, RCC_BASE};
    use crate::rcc::{CR, CR_HSIRDY, CR_HSION, CR_PLLON, CR_PLLRDY, CFGR};

    #[derive(Default)]
    pub struct Sim {
        regs: FnvIndexMap<u32, u32, 256>,
        writes: usize,
        /// Ready flags never come up when set
        pub stuck: bool,
    }

    impl Sim {
        pub fn new() -> Self {
            Self::default()
        }

        /// Number of register writes so far
        pub fn writes(&self) -> usize {
            self.writes
        }

        pub fn peek(&self, addr: u32) -> u32 {
            self.regs.get(&addr).copied().unwrap_or(0)
        }
    }

    impl Mmio for Sim {
        fn read(&self, addr: u32) -> u32 {
            self.peek(addr)
        }

        fn write(&mut self, addr: u32, value: u32) {
            self.writes += 1;
            let stored = if (NVIC_ISER..NVIC_ISER + 0x20).contains(&addr) {
                self.peek(addr) | value
            } else if (NVIC_ICER..NVIC_ICER + 0x20).contains(&addr) {
                let iser = addr - NVIC_ICER + NVIC_ISER;
                let enabled = self.peek(iser) & !value;
                self.regs.insert(iser, enabled).unwrap();
                return;
            } else if addr == RCC_BASE + CR && !self.stuck {
                let mut v = value & !(CR_HSIRDY | CR_PLLRDY);
                if value & CR_HSION != 0 {
                    v |= CR_HSIRDY;
                }
                if value & CR_PLLON != 0 {
                    v |= CR_PLLRDY;
                }
                v
            } else if addr == RCC_BASE + CFGR && !self.stuck {
                (value & !0b1100) | ((value & 0b11) << 2)
            } else {
                value
            };
            self.regs.insert(addr, stored).unwrap();
        }
    }
}
