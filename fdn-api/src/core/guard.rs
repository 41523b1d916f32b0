//! Scoped acquisition
//!
//! A [`LockGuard`] releases its lock when dropped, including during panic
//! unwinding, so every acquire path has a matching release.

use std::fmt;

use super::traits::{Locking, TimedLocking};
use super::types::Deadline;

/// RAII guard that unlocks the borrowed primitive on drop
#[must_use = "if unused the lock is released immediately"]
pub struct LockGuard<'a, L: Locking + ?Sized> {
    lock: &'a L,
}

impl<'a, L: Locking + ?Sized> LockGuard<'a, L> {
    /// Wraps a lock that the calling thread already holds.
    ///
    /// # Safety
    ///
    /// The calling thread must hold `lock`; the guard unlocks it on drop.
    pub unsafe fn adopt(lock: &'a L) -> Self {
        Self { lock }
    }

    /// Returns the guarded lock
    pub fn lock_ref(&self) -> &'a L {
        self.lock
    }
}

impl<L: Locking + ?Sized> Drop for LockGuard<'_, L> {
    fn drop(&mut self) {
        #[cfg(feature = "log")]
        log::trace!("guard released");
        self.lock.unlock();
    }
}

impl<L: Locking + ?Sized> fmt::Debug for LockGuard<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockGuard").finish_non_exhaustive()
    }
}

/// Blocks until `lock` is acquired and returns a guard releasing it
pub fn acquire<L: Locking + ?Sized>(lock: &L) -> LockGuard<'_, L> {
    lock.lock();
    LockGuard { lock }
}

/// Acquires `lock` if it is free right now
pub fn try_acquire<L: TimedLocking + ?Sized>(lock: &L) -> Option<LockGuard<'_, L>> {
    if lock.try_lock() {
        Some(LockGuard { lock })
    } else {
        None
    }
}

/// Acquires `lock` unless `deadline` passes first
pub fn acquire_before<L: TimedLocking + ?Sized>(
    lock: &L,
    deadline: Deadline,
) -> Option<LockGuard<'_, L>> {
    if lock.lock_before(deadline) {
        Some(LockGuard { lock })
    } else {
        #[cfg(feature = "log")]
        log::trace!("guard acquisition timed out ({})", deadline);
        None
    }
}

/// Runs `f` with `lock` held
pub fn with_lock<L: Locking + ?Sized, R>(lock: &L, f: impl FnOnce() -> R) -> R {
    let _guard = acquire(lock);
    f()
}
