//! NVIC priority and mask control

use boardconf_hal::{HalError, InterruptController, Priority, Vector};

use crate::map::{IRQ_COUNT, NVIC_ICER, NVIC_IPR, NVIC_ISER, PRIORITY_BITS};
use crate::mmio::Mmio;
use crate::Stm32l1;

fn irq(vector: Vector) -> Result<u32, HalError> {
    if vector.index() < IRQ_COUNT {
        Ok(u32::from(vector.0))
    } else {
        Err(HalError::InvalidVector)
    }
}

const fn word(base: u32, n: u32) -> u32 {
    base + (n / 32) * 4
}

impl<R: Mmio> InterruptController for Stm32l1<R> {
    fn set_priority(&mut self, vector: Vector, priority: Priority) -> Result<(), HalError> {
        let n = irq(vector)?;
        if priority.0 >= 1 << PRIORITY_BITS {
            return Err(HalError::InvalidPriority);
        }
        // One byte per IRQ, implemented bits at the top
        let value = u32::from(priority.0) << (8 - PRIORITY_BITS);
        self.regs
            .write_field(NVIC_IPR + (n & !3), (n % 4) * 8, 8, value);
        Ok(())
    }

    fn unmask(&mut self, vector: Vector) -> Result<(), HalError> {
        let n = irq(vector)?;
        self.regs.write(word(NVIC_ISER, n), 1 << (n % 32));
        Ok(())
    }

    fn mask(&mut self, vector: Vector) -> Result<(), HalError> {
        let n = irq(vector)?;
        self.regs.write(word(NVIC_ICER, n), 1 << (n % 32));
        #[cfg(all(target_arch = "arm", target_os = "none"))]
        {
            cortex_m::asm::dsb();
            cortex_m::asm::isb();
        }
        Ok(())
    }

    fn is_unmasked(&self, vector: Vector) -> bool {
        match irq(vector) {
            Ok(n) => self.regs.read(word(NVIC_ISER, n)) & (1 << (n % 32)) != 0,
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mmio::sim::Sim;

    #[test]
    fn test_priority_byte_lane() {
        let mut chip = Stm32l1::new(Sim::new());
        chip.set_priority(Vector(39), Priority(1)).unwrap();
        chip.set_priority(Vector(37), Priority(3)).unwrap();
        assert_eq!(chip.regs().peek(NVIC_IPR + 36), 0x10 << 24 | 0x30 << 8);
    }

    #[test]
    fn test_priority_range() {
        let mut chip = Stm32l1::new(Sim::new());
        assert_eq!(
            chip.set_priority(Vector(39), Priority(16)),
            Err(HalError::InvalidPriority)
        );
        assert_eq!(
            chip.set_priority(Vector(57), Priority(1)),
            Err(HalError::InvalidVector)
        );
    }

    #[test]
    fn test_unmask_and_mask() {
        let mut chip = Stm32l1::new(Sim::new());
        chip.unmask(Vector(46)).unwrap();
        chip.unmask(Vector(31)).unwrap();
        assert!(chip.is_unmasked(Vector(46)));
        assert!(chip.is_unmasked(Vector(31)));
        assert_eq!(chip.regs().peek(NVIC_ISER + 4), 1 << 14);
        chip.mask(Vector(46)).unwrap();
        assert!(!chip.is_unmasked(Vector(46)));
        assert!(chip.is_unmasked(Vector(31)));
        assert!(!chip.is_unmasked(Vector(200)));
    }
}
