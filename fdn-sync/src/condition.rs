//! Condition variable with its own lock (`NSCondition`)

use std::fmt;
use std::sync::Arc;

use fdn_api::{Deadline, Locking, Named, Result, TimedLocking};

use crate::attr::LockAttributes;
use crate::config::SyncChecks;
use crate::owned::OwnedMutex;
use crate::raw::NativeCondvar;
use crate::stats::LockStatsSnapshot;

/// A lock and a condition variable used together.
///
/// The usual pattern: lock, test the predicate, wait while it is false,
/// do the work, unlock. `wait` releases the lock while blocked and holds it
/// again when it returns. Wakeups carry no payload and may arrive without a
/// matching state change, so callers re-check their predicate in a loop.
///
/// ```
/// use fdn_sync::Condition;
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// let condition = Condition::new();
/// let ready = AtomicBool::new(false);
/// std::thread::scope(|s| {
///     s.spawn(|| {
///         condition.lock();
///         ready.store(true, Ordering::Relaxed);
///         condition.signal();
///         condition.unlock();
///     });
///     condition.lock();
///     while !ready.load(Ordering::Relaxed) {
///         condition.wait();
///     }
///     condition.unlock();
/// });
/// ```
pub struct Condition {
    mutex: OwnedMutex,
    condvar: NativeCondvar,
}

impl Condition {
    pub fn new() -> Self {
        Self::with_attributes(LockAttributes::default())
    }

    pub fn named(name: &str) -> Self {
        Self::with_attributes(LockAttributes::named(name))
    }

    pub fn with_attributes(attrs: LockAttributes) -> Self {
        Self::with_kind("Condition", &attrs)
    }

    pub(crate) fn with_kind(kind: &'static str, attrs: &LockAttributes) -> Self {
        Self {
            mutex: OwnedMutex::new(kind, attrs),
            condvar: NativeCondvar::new(),
        }
    }

    pub(crate) fn checks(&self) -> SyncChecks {
        self.mutex.checks()
    }

    pub fn lock(&self) {
        self.mutex.lock();
    }

    pub fn unlock(&self) {
        self.mutex.unlock();
    }

    pub fn try_unlock(&self) -> Result<()> {
        self.mutex.try_unlock()
    }

    pub fn try_lock(&self) -> bool {
        self.mutex.try_lock()
    }

    pub fn lock_before(&self, deadline: Deadline) -> bool {
        self.mutex.lock_before(deadline)
    }

    /// Blocks until signalled. The calling thread must hold the lock; it is
    /// released while blocked and held again on return. Called without the
    /// lock, the wait is reported as misuse and returns immediately.
    pub fn wait(&self) {
        self.mutex.wait_on(&self.condvar, Deadline::distant_future());
    }

    /// Blocks until signalled or until `deadline` passes. Returns false on
    /// timeout; the lock is held again either way.
    pub fn wait_until(&self, deadline: Deadline) -> bool {
        self.mutex
            .wait_on(&self.condvar, deadline)
            .unwrap_or(false)
    }

    /// Wakes one waiting thread, if any
    pub fn signal(&self) {
        if self.condvar.notify_one() {
            log::trace!("{}: signalled one waiter", self);
        }
    }

    /// Wakes every waiting thread
    pub fn broadcast(&self) {
        let woken = self.condvar.notify_all();
        if woken > 0 {
            log::trace!("{}: broadcast woke {} waiters", self, woken);
        }
    }

    /// Threads currently blocked in `wait` or `wait_until`
    pub fn waiter_count(&self) -> usize {
        self.condvar.waiter_count()
    }

    pub fn is_locked(&self) -> bool {
        self.mutex.is_locked()
    }

    pub fn is_held_by_current_thread(&self) -> bool {
        self.mutex.is_held_by_current_thread()
    }

    pub fn name(&self) -> Option<Arc<str>> {
        self.mutex.name.get()
    }

    pub fn set_name(&self, name: Option<&str>) {
        self.mutex.name.set(name);
    }

    pub fn stats(&self) -> LockStatsSnapshot {
        self.mutex.stats.snapshot()
    }
}

impl Default for Condition {
    fn default() -> Self {
        Self::new()
    }
}

impl Locking for Condition {
    fn lock(&self) {
        Condition::lock(self);
    }

    fn unlock(&self) {
        Condition::unlock(self);
    }
}

impl TimedLocking for Condition {
    fn try_lock(&self) -> bool {
        Condition::try_lock(self)
    }

    fn lock_before(&self, deadline: Deadline) -> bool {
        Condition::lock_before(self, deadline)
    }
}

impl Named for Condition {
    fn name(&self) -> Option<Arc<str>> {
        Condition::name(self)
    }

    fn set_name(&self, name: Option<&str>) {
        Condition::set_name(self, name);
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.mutex, f)
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Condition")
            .field("name", &self.name())
            .field("locked", &self.is_locked())
            .field("waiters", &self.waiter_count())
            .finish()
    }
}
