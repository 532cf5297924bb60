//! Timer descriptor

use crate::clock::ClockGate;
use crate::error::DescriptorError;
use crate::irq::Vector;
use crate::Instance;

/// One general-purpose timer instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[repr(C)]
pub struct TimerDescriptor {
    pub instance: Instance,
    pub clock: ClockGate,
    pub vector: Vector,
}

impl TimerDescriptor {
    /// Check chip-independent invariants
    pub const fn validate(&self) -> Result<(), DescriptorError> {
        self.clock.validate_peripheral()
    }
}

/// Prescaler register value for a tick rate
///
/// The counter ticks at `timer_clock / (psc + 1)`. Returns `None` when the
/// tick rate is zero, faster than the timer clock, not an exact divisor, or
/// needs a prescaler wider than 16 bits.
pub const fn prescaler(timer_clock: u32, tick_hz: u32) -> Option<u16> {
    if tick_hz == 0 || tick_hz > timer_clock || timer_clock % tick_hz != 0 {
        return None;
    }
    let psc = timer_clock / tick_hz - 1;
    if psc > u16::MAX as u32 {
        None
    } else {
        Some(psc as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prescaler_microsecond_tick() {
        assert_eq!(prescaler(32_000_000, 1_000_000), Some(31));
        assert_eq!(prescaler(32_000_000, 32_000_000), Some(0));
    }

    #[test]
    fn test_prescaler_rejects_bad_rates() {
        assert_eq!(prescaler(32_000_000, 0), None);
        assert_eq!(prescaler(32_000_000, 3_000_000), None);
        assert_eq!(prescaler(32_000_000, 64_000_000), None);
        // 32 MHz / 100 Hz needs 320_000 - 1, too wide for PSC
        assert_eq!(prescaler(32_000_000, 100), None);
    }

    #[test]
    fn test_validate_rejects_ahb_gate() {
        let timer = TimerDescriptor {
            instance: Instance::new("TIM5", 0x4000_0C00),
            clock: ClockGate::ahb(1 << 3),
            vector: Vector(46),
        };
        assert_eq!(timer.validate(), Err(DescriptorError::NotPeripheralBus));
    }
}
