//! Lock tied to an integer condition (`NSConditionLock`)

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicIsize, Ordering};

use fdn_api::{Deadline, Locking, Named, Result, TimedLocking};

use crate::attr::LockAttributes;
use crate::condition::Condition;
use crate::config::SyncChecks;
use crate::stats::LockStatsSnapshot;

/// Lock that can be acquired only while its condition has a given value.
///
/// The condition is an arbitrary integer owned by the caller's protocol.
/// It changes only through [`ConditionLock::unlock_with_condition`], which
/// wakes every thread waiting in [`ConditionLock::lock_when_condition`] so
/// each can re-check its own target value.
pub struct ConditionLock {
    condition: Condition,
    // Written only while `condition` is held.
    value: AtomicIsize,
}

impl ConditionLock {
    pub fn new(condition: isize) -> Self {
        Self::with_attributes(condition, LockAttributes::default())
    }

    pub fn named(condition: isize, name: &str) -> Self {
        Self::with_attributes(condition, LockAttributes::named(name))
    }

    pub fn with_attributes(condition: isize, attrs: LockAttributes) -> Self {
        Self {
            condition: Condition::with_kind("ConditionLock", &attrs),
            value: AtomicIsize::new(condition),
        }
    }

    /// Current condition value. Without holding the lock this is only a
    /// snapshot.
    pub fn condition(&self) -> isize {
        self.value.load(Ordering::Acquire)
    }

    /// Acquires the lock regardless of the condition
    pub fn lock(&self) {
        self.condition.lock();
    }

    /// Releases the lock leaving the condition unchanged
    pub fn unlock(&self) {
        self.condition.unlock();
    }

    pub fn try_unlock(&self) -> Result<()> {
        self.condition.try_unlock()
    }

    pub fn try_lock(&self) -> bool {
        self.condition.try_lock()
    }

    pub fn lock_before(&self, deadline: Deadline) -> bool {
        self.condition.lock_before(deadline)
    }

    /// Blocks until the lock is free and the condition equals `condition`
    pub fn lock_when_condition(&self, condition: isize) {
        self.condition.lock();
        while self.value.load(Ordering::Relaxed) != condition {
            self.condition.wait();
        }
    }

    /// Acquires the lock only if it is free and the condition already
    /// equals `condition`
    pub fn try_lock_when_condition(&self, condition: isize) -> bool {
        if !self.condition.try_lock() {
            return false;
        }
        if self.value.load(Ordering::Relaxed) == condition {
            true
        } else {
            self.condition.unlock();
            false
        }
    }

    /// Like [`ConditionLock::lock_when_condition`] but gives up at
    /// `deadline`. On timeout the lock is not held.
    pub fn lock_when_condition_before(&self, condition: isize, deadline: Deadline) -> bool {
        if !self.condition.lock_before(deadline) {
            return false;
        }
        while self.value.load(Ordering::Relaxed) != condition {
            if !self.condition.wait_until(deadline) {
                // A wakeup may race with the deadline; take the value if it
                // arrived anyway.
                if self.value.load(Ordering::Relaxed) == condition {
                    return true;
                }
                log::debug!("{}: gave up waiting for condition {}", self, condition);
                self.condition.unlock();
                return false;
            }
        }
        true
    }

    /// Sets the condition, releases the lock and wakes every waiter
    pub fn unlock_with_condition(&self, condition: isize) {
        if self.condition.checks().contains(SyncChecks::OWNERSHIP)
            && !self.condition.is_held_by_current_thread()
        {
            // Reported by unlock; the value is left alone.
            self.condition.unlock();
            return;
        }
        self.value.store(condition, Ordering::Release);
        self.condition.unlock();
        self.condition.broadcast();
    }

    pub fn is_locked(&self) -> bool {
        self.condition.is_locked()
    }

    pub fn is_held_by_current_thread(&self) -> bool {
        self.condition.is_held_by_current_thread()
    }

    pub fn waiter_count(&self) -> usize {
        self.condition.waiter_count()
    }

    pub fn name(&self) -> Option<Arc<str>> {
        self.condition.name()
    }

    pub fn set_name(&self, name: Option<&str>) {
        self.condition.set_name(name);
    }

    pub fn stats(&self) -> LockStatsSnapshot {
        self.condition.stats()
    }
}

impl Default for ConditionLock {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Locking for ConditionLock {
    fn lock(&self) {
        ConditionLock::lock(self);
    }

    fn unlock(&self) {
        ConditionLock::unlock(self);
    }
}

impl TimedLocking for ConditionLock {
    fn try_lock(&self) -> bool {
        ConditionLock::try_lock(self)
    }

    fn lock_before(&self, deadline: Deadline) -> bool {
        ConditionLock::lock_before(self, deadline)
    }
}

impl Named for ConditionLock {
    fn name(&self) -> Option<Arc<str>> {
        ConditionLock::name(self)
    }

    fn set_name(&self, name: Option<&str>) {
        ConditionLock::set_name(self, name);
    }
}

impl fmt::Display for ConditionLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.condition, f)
    }
}

impl fmt::Debug for ConditionLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionLock")
            .field("name", &self.name())
            .field("condition", &self.condition())
            .field("locked", &self.is_locked())
            .finish()
    }
}
