//! Per-instance runtime state
//!
//! Drivers keep one state slot per table index. The slots are shared
//! between thread mode and the instance's interrupt handler, so every
//! access runs inside a critical section.

use core::cell::RefCell;

use boardconf_hal::{HalError, InterruptController, Vector};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

/// State of one instance, behind its own lock
pub type Slot<T> = Mutex<CriticalSectionRawMutex, RefCell<T>>;

pub const fn slot<T>(init: T) -> Slot<T> {
    Mutex::new(RefCell::new(init))
}

/// One state slot per table index, each locked on its own
///
/// Build from a const item to fill every index:
///
/// ```
/// use boardconf_core::state::{slot, InstanceSlots, Slot};
///
/// const IDLE: Slot<u32> = slot(0);
/// static COUNTS: InstanceSlots<u32, 3> = InstanceSlots::new([IDLE; 3]);
/// ```
pub struct InstanceSlots<T, const N: usize> {
    slots: [Slot<T>; N],
}

impl<T, const N: usize> InstanceSlots<T, N> {
    pub const fn new(slots: [Slot<T>; N]) -> Self {
        Self { slots }
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// Run `f` on the slot for `index`
    ///
    /// Returns `None` for an index past the table or when called from
    /// inside another `with` on the same index. Other indices stay
    /// reachable.
    pub fn with<R>(&self, index: usize, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        self.slots.get(index)?.lock(|cell| {
            let mut state = cell.try_borrow_mut().ok()?;
            Some(f(&mut state))
        })
    }
}

/// Failure of [`with_vector_masked`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskError<R> {
    /// The vector could not be masked; `f` did not run
    Mask(HalError),
    /// `f` ran but the vector could not be unmasked and stays masked
    Restore { result: R, error: HalError },
}

/// Run `f` with one vector masked, restoring its previous state
///
/// For touching state shared with a single handler without a global
/// critical section.
pub fn with_vector_masked<I, R>(
    ic: &mut I,
    vector: Vector,
    f: impl FnOnce() -> R,
) -> Result<R, MaskError<R>>
where
    I: InterruptController,
{
    let was_unmasked = ic.is_unmasked(vector);
    if was_unmasked {
        ic.mask(vector).map_err(MaskError::Mask)?;
    }
    let result = f();
    if was_unmasked {
        if let Err(error) = ic.unmask(vector) {
            warn!("vector {} left masked: {}", vector.0, error);
            return Err(MaskError::Restore { result, error });
        }
    }
    Ok(result)
}
