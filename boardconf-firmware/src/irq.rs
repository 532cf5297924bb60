//! Interrupt wiring
//!
//! The external interrupt table is assembled from the board's vector
//! table: bound vectors jump straight to their entry function, every other
//! slot falls through to `DefaultHandler`, which asks the dispatcher and
//! reports the vector as spurious.

use core::cell::RefCell;

use boardconf_core::dispatch::InterruptSink;
use boardconf_core::state::{slot, InstanceSlots, Slot};
use boardconf_hal::Vector;
use boardconf_hal_stm32l1::{Drivers, Hardware};
use boardconf_limifrog::{DISPATCH, I2CS, UARTS};
use cortex_m_rt::exception;
use defmt::*;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Deque;

mod table {
    use boardconf_core::IsrFn;
    use boardconf_hal_stm32l1::IRQ_COUNT;
    use boardconf_limifrog::VECTORS;

    type Handler = unsafe extern "C" fn();

    extern "C" {
        fn DefaultHandler();
    }

    const SLOTS: [Option<IsrFn>; IRQ_COUNT] = *VECTORS.slots();

    const fn interrupts() -> [Handler; IRQ_COUNT] {
        let mut table = [DefaultHandler as Handler; IRQ_COUNT];
        let mut i = 0;
        while i < IRQ_COUNT {
            if let Some(isr) = SLOTS[i] {
                table[i] = isr;
            }
            i += 1;
        }
        table
    }

    #[link_section = ".vector_table.interrupts"]
    #[no_mangle]
    #[used]
    static __INTERRUPTS: [Handler; IRQ_COUNT] = interrupts();
}

#[exception]
unsafe fn DefaultHandler(irqn: i16) {
    match u16::try_from(irqn) {
        Ok(n) => {
            DISPATCH.dispatch(Vector(n), &HANDLERS);
        }
        Err(_) => warn!("unhandled exception {}", irqn),
    }
}

/// Received bytes per UART
pub type RxQueue = Deque<u8, 64>;

/// Class drivers, moved in once bring-up is done
pub static DRIVERS: Mutex<CriticalSectionRawMutex, RefCell<Option<Drivers<Hardware>>>> =
    Mutex::new(RefCell::new(None));

const EMPTY: Slot<RxQueue> = slot(Deque::new());

/// Receive queues indexed like the UART table
pub static RX: InstanceSlots<RxQueue, { UARTS.len() }> =
    InstanceSlots::new([EMPTY; UARTS.len()]);

/// Interrupt sink of this image
pub struct Handlers;

pub static HANDLERS: Handlers = Handlers;

impl Handlers {
    fn with_drivers<R>(&self, f: impl FnOnce(&mut Drivers<Hardware>) -> R) -> Option<R> {
        DRIVERS.lock(|cell| cell.borrow_mut().as_mut().map(f))
    }
}

impl InterruptSink for Handlers {
    fn on_timer(&self, index: usize) {
        trace!("timer {}", index);
    }

    fn on_uart(&self, index: usize) {
        let Some(desc) = UARTS.get(index) else {
            return;
        };
        self.with_drivers(|drivers| {
            while let Some(byte) = drivers.uart_receive(desc) {
                let stored = RX.with(index, |queue| queue.push_back(byte).is_ok());
                if stored != Some(true) {
                    warn!("uart {}: rx overflow", index);
                }
            }
        });
    }

    fn on_spi(&self, index: usize) {
        trace!("spi {}", index);
    }

    fn on_i2c_event(&self, index: usize) {
        trace!("i2c {} event", index);
    }

    fn on_i2c_error(&self, index: usize) {
        let Some(desc) = I2CS.get(index) else {
            return;
        };
        if let Some(errors) = self.with_drivers(|drivers| drivers.i2c_take_errors(desc)) {
            warn!("i2c {}: error flags {=u32:#x}", index, errors);
        }
    }
}
