//! LimiFrog v1 firmware
//!
//! Brings the board up from its peripheral configuration: clock tree,
//! then every timer, UART, SPI and I2C instance in table order, then
//! idles and reports received UART bytes.

#![no_std]
#![no_main]

use boardconf_core::dispatch;
use boardconf_core::Initializer;
use boardconf_hal_stm32l1::{DriverConfig, Stm32l1};
use boardconf_limifrog::{board, clocks, isr, NAME, UARTS};
use cortex_m_rt::entry;
use defmt::*;
use {defmt_rtt as _, panic_probe as _};

mod irq;

use irq::{DRIVERS, HANDLERS, RX};

#[entry]
fn main() -> ! {
    info!("{} starting", NAME);

    if !dispatch::install(&HANDLERS) {
        warn!("interrupt sink was already installed");
    }

    if let Err(errors) = isr::check_bindings() {
        defmt::panic!("{} ISR binding errors", errors.len());
    }

    let Some((mut chip, mut drivers)) = Stm32l1::take(DriverConfig::default()) else {
        defmt::panic!("chip already taken");
    };

    match chip.apply_clock_tree(&clocks::CLOCK_TREE) {
        Ok(clocks) => info!("core clock {} Hz", clocks.core),
        Err(e) => defmt::panic!("clock tree: {}", e),
    }

    // Hold interrupts until the drivers are reachable from the sink
    let done = cortex_m::interrupt::free(|_| {
        let done = Initializer::new(&mut chip, &mut drivers).bring_up_or_halt(board());
        DRIVERS.lock(|cell| *cell.borrow_mut() = Some(drivers));
        done
    });
    info!("peripherals up: {}", done);

    loop {
        cortex_m::asm::wfi();
        for index in 0..UARTS.len() {
            while let Some(Some(byte)) = RX.with(index, |queue| queue.pop_front()) {
                debug!("uart {}: {=u8:#x}", index, byte);
            }
        }
    }
}
