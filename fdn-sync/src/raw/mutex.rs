//! Native mutual exclusion
//!
//! One byte of state. `LOCKED_BIT` is the lock itself; `PARKED_BIT` records
//! that at least one thread may be parked on the state's address, so the
//! uncontended unlock is a single compare-exchange and only contended unlocks
//! touch the parking lot.

use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;

use parking_lot_core::{
    self, ParkResult, SpinWait, UnparkResult, DEFAULT_PARK_TOKEN, DEFAULT_UNPARK_TOKEN,
};

const LOCKED_BIT: u8 = 0b01;
const PARKED_BIT: u8 = 0b10;

/// Non-recursive native mutex without an owner record
pub struct NativeMutex {
    state: AtomicU8,
}

impl NativeMutex {
    /// Create a new unlocked mutex
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(0),
        }
    }

    /// Blocks until the mutex is acquired
    #[inline]
    pub fn lock(&self) {
        if self
            .state
            .compare_exchange_weak(0, LOCKED_BIT, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            self.lock_slow(None);
        }
    }

    /// Acquires the mutex if it is free, never blocks
    #[inline]
    pub fn try_lock(&self) -> bool {
        let mut state = self.state.load(Ordering::Relaxed);
        loop {
            if state & LOCKED_BIT != 0 {
                return false;
            }
            match self.state.compare_exchange_weak(
                state,
                state | LOCKED_BIT,
                Ordering::Acquire,
                Ordering::Relaxed,
            ) {
                Ok(_) => return true,
                Err(actual) => state = actual,
            }
        }
    }

    /// Blocks until the mutex is acquired or `deadline` passes.
    ///
    /// `None` waits forever. A deadline in the past degrades to
    /// [`NativeMutex::try_lock`]. On timeout the mutex state is exactly as if
    /// this thread had never tried.
    pub fn lock_until(&self, deadline: Option<Instant>) -> bool {
        if self.try_lock() {
            return true;
        }
        match deadline {
            Some(instant) if Instant::now() >= instant => false,
            _ => self.lock_slow(deadline),
        }
    }

    /// Releases the mutex.
    ///
    /// # Safety
    ///
    /// The mutex must be locked, and the caller must be the context that
    /// locked it.
    #[inline]
    pub unsafe fn unlock(&self) {
        if self
            .state
            .compare_exchange(LOCKED_BIT, 0, Ordering::Release, Ordering::Relaxed)
            .is_ok()
        {
            return;
        }
        self.unlock_slow();
    }

    /// Returns true if some thread currently holds the mutex
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.state.load(Ordering::Relaxed) & LOCKED_BIT != 0
    }

    fn key(&self) -> usize {
        &self.state as *const AtomicU8 as usize
    }

    #[cold]
    fn lock_slow(&self, deadline: Option<Instant>) -> bool {
        let mut spin = SpinWait::new();
        let mut state = self.state.load(Ordering::Relaxed);
        loop {
            // Grab the lock if it is free, even when others are parked.
            if state & LOCKED_BIT == 0 {
                match self.state.compare_exchange_weak(
                    state,
                    state | LOCKED_BIT,
                    Ordering::Acquire,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => return true,
                    Err(actual) => state = actual,
                }
                continue;
            }

            // Spin a little while nobody is parked.
            if state & PARKED_BIT == 0 && spin.spin() {
                state = self.state.load(Ordering::Relaxed);
                continue;
            }

            if state & PARKED_BIT == 0 {
                if let Err(actual) = self.state.compare_exchange_weak(
                    state,
                    state | PARKED_BIT,
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    state = actual;
                    continue;
                }
            }

            let validate = || self.state.load(Ordering::Relaxed) == LOCKED_BIT | PARKED_BIT;
            let before_sleep = || {};
            let timed_out = |_key, was_last_thread: bool| {
                // Leaving the queue empty: nobody is parked any more.
                if was_last_thread {
                    self.state.fetch_and(!PARKED_BIT, Ordering::Relaxed);
                }
            };
            // SAFETY: the key is the address of our own state word and none of
            // the callbacks call back into the parking lot.
            let result = unsafe {
                parking_lot_core::park(
                    self.key(),
                    validate,
                    before_sleep,
                    timed_out,
                    DEFAULT_PARK_TOKEN,
                    deadline,
                )
            };
            match result {
                ParkResult::TimedOut => {
                    log::trace!("native mutex {:#x}: timed out while parked", self.key());
                    return false;
                }
                ParkResult::Unparked(_) | ParkResult::Invalid => {}
            }

            spin.reset();
            state = self.state.load(Ordering::Relaxed);
        }
    }

    #[cold]
    fn unlock_slow(&self) {
        let callback = |result: UnparkResult| {
            // Clear the lock while the bucket is still locked so a thread
            // that is about to park re-validates against the new state.
            if result.have_more_threads {
                self.state.store(PARKED_BIT, Ordering::Release);
            } else {
                self.state.store(0, Ordering::Release);
            }
            DEFAULT_UNPARK_TOKEN
        };
        // SAFETY: the key is the address of our own state word and the
        // callback does not call back into the parking lot.
        unsafe {
            parking_lot_core::unpark_one(self.key(), callback);
        }
    }
}

impl Default for NativeMutex {
    fn default() -> Self {
        Self::new()
    }
}
