//! Native recursive mutex
//!
//! A [`NativeMutex`] plus the owning thread's id and a depth counter. Only
//! the owner ever touches `depth`, so relaxed ordering is enough: the
//! mutex's acquire/release edges order it against the previous owner.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use super::mutex::NativeMutex;
use crate::thread_id;

/// Mutex the owning thread may acquire again without deadlocking
pub struct NativeRecursiveMutex {
    mutex: NativeMutex,
    owner: AtomicUsize,
    depth: AtomicUsize,
}

impl NativeRecursiveMutex {
    /// Create a new unlocked recursive mutex
    pub const fn new() -> Self {
        Self {
            mutex: NativeMutex::new(),
            owner: AtomicUsize::new(0),
            depth: AtomicUsize::new(0),
        }
    }

    /// Blocks until acquired; the owner re-enters immediately
    pub fn lock(&self) {
        let me = thread_id::current();
        if self.reenter(me) {
            return;
        }
        self.mutex.lock();
        self.take_ownership(me);
    }

    /// Acquires if free or already owned by the calling thread
    pub fn try_lock(&self) -> bool {
        let me = thread_id::current();
        if self.reenter(me) {
            return true;
        }
        if self.mutex.try_lock() {
            self.take_ownership(me);
            true
        } else {
            false
        }
    }

    /// Acquires unless `deadline` passes first; the owner re-enters
    /// immediately regardless of the deadline
    pub fn lock_until(&self, deadline: Option<Instant>) -> bool {
        let me = thread_id::current();
        if self.reenter(me) {
            return true;
        }
        if self.mutex.lock_until(deadline) {
            self.take_ownership(me);
            true
        } else {
            false
        }
    }

    /// Drops one level of recursion, releasing the mutex at depth zero.
    /// Returns true when the mutex was fully released.
    ///
    /// # Safety
    ///
    /// The calling thread must own the mutex.
    pub unsafe fn unlock(&self) -> bool {
        debug_assert!(self.is_owned_by_current_thread());
        let depth = self.depth.load(Ordering::Relaxed);
        if depth > 1 {
            self.depth.store(depth - 1, Ordering::Relaxed);
            return false;
        }
        self.depth.store(0, Ordering::Relaxed);
        self.owner.store(0, Ordering::Relaxed);
        // SAFETY: ownership implies we locked the inner mutex.
        unsafe { self.mutex.unlock() };
        true
    }

    /// True if the calling thread owns the mutex
    pub fn is_owned_by_current_thread(&self) -> bool {
        self.owner.load(Ordering::Relaxed) == thread_id::current().get()
    }

    /// True if any thread owns the mutex
    pub fn is_locked(&self) -> bool {
        self.mutex.is_locked()
    }

    /// Recursion depth as seen by the calling thread, 0 if it is not the owner
    pub fn depth(&self) -> usize {
        if self.is_owned_by_current_thread() {
            self.depth.load(Ordering::Relaxed)
        } else {
            0
        }
    }

    fn reenter(&self, me: NonZeroUsize) -> bool {
        if self.owner.load(Ordering::Relaxed) != me.get() {
            return false;
        }
        let depth = self.depth.load(Ordering::Relaxed);
        assert!(depth < usize::MAX, "recursive mutex depth overflow");
        self.depth.store(depth + 1, Ordering::Relaxed);
        true
    }

    fn take_ownership(&self, me: NonZeroUsize) {
        self.owner.store(me.get(), Ordering::Relaxed);
        self.depth.store(1, Ordering::Relaxed);
    }
}

impl Default for NativeRecursiveMutex {
    fn default() -> Self {
        Self::new()
    }
}
