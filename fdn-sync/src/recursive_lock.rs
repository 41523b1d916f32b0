//! Recursive lock (`NSRecursiveLock`)

use std::fmt;
use std::sync::Arc;

use fdn_api::{Deadline, Error, Locking, Named, Result, TimedLocking};

use crate::attr::LockAttributes;
use crate::config::SyncChecks;
use crate::misuse;
use crate::name::LockName;
use crate::raw::NativeRecursiveMutex;
use crate::stats::{LockStats, LockStatsSnapshot};

/// Lock the owning thread may acquire repeatedly.
///
/// Every `lock` must be balanced by an `unlock` from the same thread; the
/// lock becomes available to others once the count returns to zero.
/// Unlike [`crate::Lock`], ownership is always verified on unlock, since
/// the recursion count belongs to the owner.
pub struct RecursiveLock {
    raw: NativeRecursiveMutex,
    checks: SyncChecks,
    name: LockName,
    stats: LockStats,
}

impl RecursiveLock {
    pub fn new() -> Self {
        Self::with_attributes(LockAttributes::default())
    }

    pub fn named(name: &str) -> Self {
        Self::with_attributes(LockAttributes::named(name))
    }

    pub fn with_attributes(attrs: LockAttributes) -> Self {
        Self {
            raw: NativeRecursiveMutex::new(),
            checks: attrs.resolved_checks(),
            name: LockName::new(attrs.name.as_deref()),
            stats: LockStats::new(),
        }
    }

    /// Acquires the lock, or adds one level if the caller already holds it
    pub fn lock(&self) {
        let contended = !self.raw.try_lock();
        if contended {
            log::trace!("{}: contended, blocking", self);
            self.raw.lock();
        }
        self.stats.record_acquire(contended);
    }

    pub fn try_lock(&self) -> bool {
        let acquired = self.raw.try_lock();
        if acquired {
            self.stats.record_acquire(false);
        }
        acquired
    }

    /// Like [`RecursiveLock::lock`] but gives up at `deadline`. The owner
    /// always succeeds.
    pub fn lock_before(&self, deadline: Deadline) -> bool {
        if self.raw.try_lock() {
            self.stats.record_acquire(false);
            return true;
        }
        if self.raw.lock_until(deadline.instant()) {
            self.stats.record_acquire(true);
            true
        } else {
            self.stats.record_timeout();
            log::debug!("{}: lock timed out ({})", self, deadline);
            false
        }
    }

    /// Removes one level; the lock is released when the count reaches zero.
    /// Misuse from a non-owner is reported and otherwise ignored.
    pub fn unlock(&self) {
        if let Err(error) = self.try_unlock() {
            self.stats.record_misuse();
            misuse::report(self.checks, error);
        }
    }

    /// Removes one level, failing with `NotOwner` if the calling thread does
    /// not hold the lock
    pub fn try_unlock(&self) -> Result<()> {
        if !self.raw.is_owned_by_current_thread() {
            return Err(Error::NotOwner {
                operation: "unlock",
                lock: self.name.describe(),
            });
        }
        // SAFETY: ownership checked above.
        if unsafe { self.raw.unlock() } {
            log::trace!("{}: released", self);
        }
        Ok(())
    }

    pub fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }

    pub fn is_held_by_current_thread(&self) -> bool {
        self.raw.is_owned_by_current_thread()
    }

    /// Outstanding `lock` calls of the calling thread, 0 if it does not
    /// hold the lock
    pub fn depth(&self) -> usize {
        self.raw.depth()
    }

    pub fn name(&self) -> Option<Arc<str>> {
        self.name.get()
    }

    pub fn set_name(&self, name: Option<&str>) {
        self.name.set(name);
    }

    pub fn stats(&self) -> LockStatsSnapshot {
        self.stats.snapshot()
    }
}

impl Default for RecursiveLock {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RecursiveLock {
    fn drop(&mut self) {
        if self.checks.contains(SyncChecks::DROP_WHILE_HELD) && self.raw.is_locked() {
            let error = Error::DestroyedWhileHeld(self.to_string());
            self.stats.record_misuse();
            misuse::report(self.checks, error);
        }
    }
}

impl Locking for RecursiveLock {
    fn lock(&self) {
        RecursiveLock::lock(self);
    }

    fn unlock(&self) {
        RecursiveLock::unlock(self);
    }
}

impl TimedLocking for RecursiveLock {
    fn try_lock(&self) -> bool {
        RecursiveLock::try_lock(self)
    }

    fn lock_before(&self, deadline: Deadline) -> bool {
        RecursiveLock::lock_before(self, deadline)
    }
}

impl Named for RecursiveLock {
    fn name(&self) -> Option<Arc<str>> {
        RecursiveLock::name(self)
    }

    fn set_name(&self, name: Option<&str>) {
        RecursiveLock::set_name(self, name);
    }
}

impl fmt::Display for RecursiveLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name.fmt_labelled(f, "RecursiveLock", self)
    }
}

impl fmt::Debug for RecursiveLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecursiveLock")
            .field("name", &self.name())
            .field("locked", &self.is_locked())
            .finish()
    }
}
