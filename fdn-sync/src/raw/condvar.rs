//! Native condition variable with deadline support
//!
//! Waiters park on the condvar's own address. The associated mutex is
//! released from the parking lot's `before_sleep` hook, which runs after the
//! waiter has been queued: a signal issued by a thread that acquired the
//! mutex after that release always finds the waiter in the queue.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use parking_lot_core::{self, DEFAULT_PARK_TOKEN, DEFAULT_UNPARK_TOKEN};

use super::mutex::NativeMutex;

/// Timed wait primitive paired with a [`NativeMutex`]
pub struct NativeCondvar {
    // Threads between queueing and re-locking. Changes while the paired
    // mutex is held, so signalers holding the mutex read it reliably.
    waiters: AtomicUsize,
}

impl NativeCondvar {
    /// Create a new condition variable
    pub const fn new() -> Self {
        Self {
            waiters: AtomicUsize::new(0),
        }
    }

    fn key(&self) -> usize {
        self as *const Self as usize
    }

    /// Atomically releases `mutex` and blocks until notified, then
    /// reacquires `mutex`.
    ///
    /// # Safety
    ///
    /// The calling thread must hold `mutex`, and every concurrent waiter on
    /// this condvar must use the same mutex.
    pub unsafe fn wait(&self, mutex: &NativeMutex) {
        // SAFETY: forwarded caller contract.
        unsafe { self.wait_until(mutex, None) };
    }

    /// Like [`NativeCondvar::wait`] but gives up at `deadline`.
    ///
    /// Returns true if woken by a notification, false on timeout. `mutex` is
    /// held again on return in both cases.
    ///
    /// # Safety
    ///
    /// Same contract as [`NativeCondvar::wait`].
    pub unsafe fn wait_until(&self, mutex: &NativeMutex, deadline: Option<Instant>) -> bool {
        self.waiters.fetch_add(1, Ordering::Relaxed);

        let validate = || true;
        // SAFETY: the caller holds `mutex`; unparking from before_sleep is
        // allowed by the parking lot.
        let before_sleep = || unsafe { mutex.unlock() };
        let timed_out = |_key, _was_last_thread| {};
        // SAFETY: the key is our own address and the callbacks never park.
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

        self.waiters.fetch_sub(1, Ordering::Relaxed);
        mutex.lock();

        let notified = result.is_unparked();
        if !notified {
            log::trace!("native condvar {:#x}: wait timed out", self.key());
        }
        notified
    }

    /// Wakes at most one waiter. Returns true if a thread was woken.
    pub fn notify_one(&self) -> bool {
        if self.waiters.load(Ordering::Relaxed) == 0 {
            return false;
        }
        // SAFETY: the key is our own address and the callback never parks.
        let result = unsafe { parking_lot_core::unpark_one(self.key(), |_| DEFAULT_UNPARK_TOKEN) };
        result.unparked_threads != 0
    }

    /// Wakes every current waiter. Returns how many threads were woken.
    pub fn notify_all(&self) -> usize {
        if self.waiters.load(Ordering::Relaxed) == 0 {
            return 0;
        }
        // SAFETY: the key is our own address.
        unsafe { parking_lot_core::unpark_all(self.key(), DEFAULT_UNPARK_TOKEN) }
    }

    /// Threads currently inside a wait
    pub fn waiter_count(&self) -> usize {
        self.waiters.load(Ordering::Relaxed)
    }
}

impl Default for NativeCondvar {
    fn default() -> Self {
        Self::new()
    }
}
