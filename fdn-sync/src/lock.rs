//! Non-recursive lock (`NSLock`)

use std::fmt;
use std::sync::Arc;

use fdn_api::{Deadline, Locking, Named, Result, TimedLocking};

use crate::attr::LockAttributes;
use crate::owned::OwnedMutex;
use crate::stats::LockStatsSnapshot;

/// Mutual exclusion lock with explicit lock and unlock calls.
///
/// Locking again from the owning thread deadlocks; with
/// [`crate::SyncChecks::DEADLOCK`] the attempt is reported before blocking.
/// Unlocking from a thread that does not hold the lock is refused and
/// reported (see [`crate::misuse`]); [`Lock::try_unlock`] returns the same
/// condition as an error instead.
pub struct Lock {
    inner: OwnedMutex,
}

impl Lock {
    /// Create an unnamed lock using the process-wide checks
    pub fn new() -> Self {
        Self::with_attributes(LockAttributes::default())
    }

    /// Create a lock carrying a diagnostic name
    pub fn named(name: &str) -> Self {
        Self::with_attributes(LockAttributes::named(name))
    }

    /// Create a lock from explicit attributes
    pub fn with_attributes(attrs: LockAttributes) -> Self {
        Self {
            inner: OwnedMutex::new("Lock", &attrs),
        }
    }

    /// Blocks until the lock is acquired
    pub fn lock(&self) {
        self.inner.lock();
    }

    /// Releases the lock
    pub fn unlock(&self) {
        self.inner.unlock();
    }

    /// Releases the lock, failing with `NotOwner` if the calling thread does
    /// not hold it
    pub fn try_unlock(&self) -> Result<()> {
        self.inner.try_unlock()
    }

    /// Acquires the lock if it is free, never blocks
    pub fn try_lock(&self) -> bool {
        self.inner.try_lock()
    }

    /// Acquires the lock unless `deadline` passes first
    pub fn lock_before(&self, deadline: Deadline) -> bool {
        self.inner.lock_before(deadline)
    }

    /// True if any thread holds the lock
    pub fn is_locked(&self) -> bool {
        self.inner.is_locked()
    }

    /// True if the calling thread holds the lock
    pub fn is_held_by_current_thread(&self) -> bool {
        self.inner.is_held_by_current_thread()
    }

    /// Diagnostic name
    pub fn name(&self) -> Option<Arc<str>> {
        self.inner.name.get()
    }

    /// Replace the diagnostic name
    pub fn set_name(&self, name: Option<&str>) {
        self.inner.name.set(name);
    }

    /// Usage counters
    pub fn stats(&self) -> LockStatsSnapshot {
        self.inner.stats.snapshot()
    }
}

impl Default for Lock {
    fn default() -> Self {
        Self::new()
    }
}

impl Locking for Lock {
    fn lock(&self) {
        Lock::lock(self);
    }

    fn unlock(&self) {
        Lock::unlock(self);
    }
}

impl TimedLocking for Lock {
    fn try_lock(&self) -> bool {
        Lock::try_lock(self)
    }

    fn lock_before(&self, deadline: Deadline) -> bool {
        Lock::lock_before(self, deadline)
    }
}

impl Named for Lock {
    fn name(&self) -> Option<Arc<str>> {
        Lock::name(self)
    }

    fn set_name(&self, name: Option<&str>) {
        Lock::set_name(self, name);
    }
}

impl fmt::Display for Lock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl fmt::Debug for Lock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lock")
            .field("name", &self.name())
            .field("locked", &self.is_locked())
            .finish()
    }
}
