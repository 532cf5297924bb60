//! Class drivers
//!
//! Minimal per-instance setup run by bring-up once the instance has its
//! clock and pins: timers count at a fixed tick, UARTs get their frame
//! format and baud rate, SPI runs as master and I2C gets its bus timing
//! with event and error interrupts enabled.

use boardconf_core::InstanceDriver;
use boardconf_hal::i2c::{timing, I2cConfig};
use boardconf_hal::spi::{BaudPrescaler, Phase, Polarity, SpiConfig};
use boardconf_hal::timer::prescaler;
use boardconf_hal::uart::{brr, DataBits, Parity, StopBits, UartConfig};
use boardconf_hal::{HalError, I2cDescriptor, SpiDescriptor, TimerDescriptor, UartDescriptor};

use crate::mmio::Mmio;

mod tim {
    pub const CR1: u32 = 0x00;
    pub const EGR: u32 = 0x14;
    pub const PSC: u32 = 0x28;
    pub const ARR: u32 = 0x2C;
    pub const CR1_CEN: u32 = 1 << 0;
    pub const EGR_UG: u32 = 1 << 0;
}

mod usart {
    pub const SR: u32 = 0x00;
    pub const DR: u32 = 0x04;
    pub const SR_RXNE: u32 = 1 << 5;
    pub const BRR: u32 = 0x08;
    pub const CR1: u32 = 0x0C;
    pub const CR2: u32 = 0x10;
    pub const CR1_RE: u32 = 1 << 2;
    pub const CR1_TE: u32 = 1 << 3;
    pub const CR1_RXNEIE: u32 = 1 << 5;
    pub const CR1_PS: u32 = 1 << 9;
    pub const CR1_PCE: u32 = 1 << 10;
    pub const CR1_M: u32 = 1 << 12;
    pub const CR1_UE: u32 = 1 << 13;
    pub const CR2_STOP2: u32 = 0b10 << 12;
}

mod spi {
    pub const CR1: u32 = 0x00;
    pub const CR1_CPHA: u32 = 1 << 0;
    pub const CR1_CPOL: u32 = 1 << 1;
    pub const CR1_MSTR: u32 = 1 << 2;
    pub const CR1_BR_SHIFT: u32 = 3;
    pub const CR1_SPE: u32 = 1 << 6;
    pub const CR1_SSI: u32 = 1 << 8;
    pub const CR1_SSM: u32 = 1 << 9;
}

mod i2c {
    pub const CR1: u32 = 0x00;
    pub const CR2: u32 = 0x04;
    pub const SR1: u32 = 0x14;
    pub const CCR: u32 = 0x1C;
    pub const TRISE: u32 = 0x20;
    pub const CR1_PE: u32 = 1 << 0;
    pub const CR2_ITERREN: u32 = 1 << 8;
    pub const CR2_ITEVTEN: u32 = 1 << 9;
    pub const CCR_FS: u32 = 1 << 15;
    /// BERR, ARLO, AF, OVR, PECERR, TIMEOUT, SMBALERT
    pub const SR1_ERRORS: u32 = 0xDF00;
}

/// Settings applied to every instance of a class
#[derive(Debug, Clone, Copy)]
pub struct DriverConfig {
    /// Counter tick rate for every timer
    pub timer_tick_hz: u32,
    pub uart: UartConfig,
    pub spi: SpiConfig,
    pub i2c: I2cConfig,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            timer_tick_hz: 1_000_000,
            uart: UartConfig::default(),
            spi: SpiConfig::default(),
            i2c: I2cConfig::default(),
        }
    }
}

/// Register-level class drivers
pub struct Drivers<R> {
    regs: R,
    config: DriverConfig,
}

impl<R: Mmio> Drivers<R> {
    pub fn new(regs: R, config: DriverConfig) -> Self {
        Self { regs, config }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn regs(&self) -> &R {
        &self.regs
    }

    /// Take the received byte of a UART, if one is waiting
    ///
    /// Reading the data register clears the receive interrupt.
    pub fn uart_receive(&mut self, desc: &UartDescriptor) -> Option<u8> {
        let base = desc.instance.base;
        if self.regs.read(base + usart::SR) & usart::SR_RXNE == 0 {
            return None;
        }
        Some(self.regs.read(base + usart::DR) as u8)
    }

    /// Clear and return the pending error flags of an I2C instance
    pub fn i2c_take_errors(&mut self, desc: &I2cDescriptor) -> u32 {
        let sr1 = desc.instance.base + i2c::SR1;
        let errors = self.regs.read(sr1) & i2c::SR1_ERRORS;
        if errors != 0 {
            self.regs.clear_bits(sr1, errors);
        }
        errors
    }
}

/// USART CR1/CR2 bits for a frame format
///
/// The M bit counts the parity bit, so 8 data bits with parity need a
/// 9-bit frame. Seven data bits only exist with parity.
fn frame_bits(config: &UartConfig) -> Result<(u32, u32), HalError> {
    let parity = match config.parity {
        Parity::None => 0,
        Parity::Even => usart::CR1_PCE,
        Parity::Odd => usart::CR1_PCE | usart::CR1_PS,
    };
    let m = match (config.data_bits, config.parity) {
        (DataBits::Seven, Parity::None) => return Err(HalError::UnsupportedRate),
        (DataBits::Seven, _) | (DataBits::Eight, Parity::None) => 0,
        (DataBits::Eight, _) | (DataBits::Nine, Parity::None) => usart::CR1_M,
        (DataBits::Nine, _) => return Err(HalError::UnsupportedRate),
    };
    let stop = match config.stop_bits {
        StopBits::One => 0,
        StopBits::Two => usart::CR2_STOP2,
    };
    Ok((parity | m, stop))
}

impl<R: Mmio> InstanceDriver for Drivers<R> {
    fn enable_timer(
        &mut self,
        index: usize,
        desc: &TimerDescriptor,
        clock_hz: u32,
    ) -> Result<(), HalError> {
        let psc = prescaler(clock_hz, self.config.timer_tick_hz).ok_or(HalError::UnsupportedRate)?;
        let base = desc.instance.base;
        self.regs.write(base + tim::PSC, u32::from(psc));
        self.regs.write(base + tim::ARR, u32::MAX);
        self.regs.write(base + tim::EGR, tim::EGR_UG);
        self.regs.set_bits(base + tim::CR1, tim::CR1_CEN);
        debug!("timer {}: psc {}", index, psc);
        Ok(())
    }

    fn enable_uart(
        &mut self,
        index: usize,
        desc: &UartDescriptor,
        clock_hz: u32,
    ) -> Result<(), HalError> {
        let config = self.config.uart;
        let div = brr(clock_hz, config.baudrate).ok_or(HalError::UnsupportedRate)?;
        let (cr1_frame, cr2) = frame_bits(&config)?;
        let base = desc.instance.base;
        self.regs.write(base + usart::CR1, 0);
        self.regs.write(base + usart::BRR, u32::from(div));
        self.regs.write(base + usart::CR2, cr2);
        self.regs.write(
            base + usart::CR1,
            cr1_frame | usart::CR1_RE | usart::CR1_TE | usart::CR1_RXNEIE | usart::CR1_UE,
        );
        debug!("uart {}: {} baud, brr {}", index, config.baudrate, div);
        Ok(())
    }

    fn enable_spi(
        &mut self,
        index: usize,
        desc: &SpiDescriptor,
        clock_hz: u32,
    ) -> Result<(), HalError> {
        let config = self.config.spi;
        let br = BaudPrescaler::for_target(clock_hz, config.frequency);
        let mut cr1 = spi::CR1_MSTR
            | spi::CR1_SSM
            | spi::CR1_SSI
            | u32::from(br.bits()) << spi::CR1_BR_SHIFT;
        if config.polarity == Polarity::IdleHigh {
            cr1 |= spi::CR1_CPOL;
        }
        if config.phase == Phase::CaptureOnSecondTransition {
            cr1 |= spi::CR1_CPHA;
        }
        let base = desc.instance.base;
        self.regs.write(base + spi::CR1, cr1);
        self.regs.set_bits(base + spi::CR1, spi::CR1_SPE);
        debug!("spi {}: sck {} Hz", index, clock_hz / br.divisor());
        Ok(())
    }

    fn enable_i2c(
        &mut self,
        index: usize,
        desc: &I2cDescriptor,
        clock_hz: u32,
    ) -> Result<(), HalError> {
        let t = timing(clock_hz, self.config.i2c.frequency).ok_or(HalError::UnsupportedRate)?;
        let base = desc.instance.base;
        self.regs.clear_bits(base + i2c::CR1, i2c::CR1_PE);
        self.regs.write(
            base + i2c::CR2,
            u32::from(t.freq_mhz) | i2c::CR2_ITERREN | i2c::CR2_ITEVTEN,
        );
        let fs = if t.fast { i2c::CCR_FS } else { 0 };
        self.regs.write(base + i2c::CCR, u32::from(t.ccr) | fs);
        self.regs.write(base + i2c::TRISE, u32::from(t.trise));
        self.regs.set_bits(base + i2c::CR1, i2c::CR1_PE);
        debug!("i2c {}: ccr {} trise {}", index, t.ccr, t.trise);
        Ok(())
    }
}
