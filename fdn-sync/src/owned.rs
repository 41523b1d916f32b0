//! Native mutex with owner tracking
//!
//! Shared core of [`crate::Lock`] and [`crate::Condition`]: the owner word
//! lets unlock and wait verify the caller, and lets drop detect a primitive
//! that is still held.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use fdn_api::{Deadline, Error, Result};

use crate::attr::LockAttributes;
use crate::config::SyncChecks;
use crate::misuse;
use crate::name::LockName;
use crate::raw::{NativeCondvar, NativeMutex};
use crate::stats::LockStats;
use crate::thread_id;

pub(crate) struct OwnedMutex {
    raw: NativeMutex,
    // Id of the holding thread, 0 when free. Written only by the holder.
    owner: AtomicUsize,
    checks: SyncChecks,
    kind: &'static str,
    pub(crate) name: LockName,
    pub(crate) stats: LockStats,
}

impl OwnedMutex {
    pub(crate) fn new(kind: &'static str, attrs: &LockAttributes) -> Self {
        Self {
            raw: NativeMutex::new(),
            owner: AtomicUsize::new(0),
            checks: attrs.resolved_checks(),
            kind,
            name: LockName::new(attrs.name.as_deref()),
            stats: LockStats::new(),
        }
    }

    pub(crate) fn checks(&self) -> SyncChecks {
        self.checks
    }

    pub(crate) fn is_locked(&self) -> bool {
        self.raw.is_locked()
    }

    pub(crate) fn is_held_by_current_thread(&self) -> bool {
        self.owner.load(Ordering::Relaxed) == thread_id::current().get()
    }

    pub(crate) fn lock(&self) {
        if self.checks.contains(SyncChecks::DEADLOCK) && self.is_held_by_current_thread() {
            self.report(Error::WouldDeadlock {
                lock: self.name.describe(),
            });
        }
        let contended = !self.raw.try_lock();
        if contended {
            log::trace!("{}: contended, blocking", self);
            self.raw.lock();
        }
        self.acquired(contended);
    }

    pub(crate) fn try_lock(&self) -> bool {
        if self.raw.try_lock() {
            self.acquired(false);
            true
        } else {
            false
        }
    }

    pub(crate) fn lock_before(&self, deadline: Deadline) -> bool {
        if self.raw.try_lock() {
            self.acquired(false);
            return true;
        }
        if self.raw.lock_until(deadline.instant()) {
            self.acquired(true);
            true
        } else {
            self.stats.record_timeout();
            log::debug!("{}: lock timed out ({})", self, deadline);
            false
        }
    }

    pub(crate) fn try_unlock(&self) -> Result<()> {
        if !self.is_held_by_current_thread() {
            return Err(Error::NotOwner {
                operation: "unlock",
                lock: self.name.describe(),
            });
        }
        self.release();
        Ok(())
    }

    pub(crate) fn unlock(&self) {
        if !self.checks.contains(SyncChecks::OWNERSHIP) {
            // Unchecked: the caller vouches for holding the lock.
            self.release();
        } else if let Err(error) = self.try_unlock() {
            self.report(error);
        }
    }

    /// Releases the mutex, waits on `condvar` and reacquires. `None` when
    /// the calling thread does not hold the mutex.
    pub(crate) fn wait_on(&self, condvar: &NativeCondvar, deadline: Deadline) -> Option<bool> {
        let me = thread_id::current();
        if self.owner.load(Ordering::Relaxed) != me.get() {
            self.report(Error::NotOwner {
                operation: "wait",
                lock: self.name.describe(),
            });
            return None;
        }
        self.stats.record_wait();
        self.owner.store(0, Ordering::Relaxed);
        // SAFETY: this thread holds `raw`, and `condvar` is only ever paired
        // with this mutex by the owning primitive.
        let notified = unsafe { condvar.wait_until(&self.raw, deadline.instant()) };
        self.owner.store(me.get(), Ordering::Relaxed);
        if !notified {
            self.stats.record_timeout();
        }
        Some(notified)
    }

    pub(crate) fn report(&self, error: Error) {
        self.stats.record_misuse();
        misuse::report(self.checks, error);
    }

    fn acquired(&self, contended: bool) {
        self.owner
            .store(thread_id::current().get(), Ordering::Relaxed);
        self.stats.record_acquire(contended);
    }

    fn release(&self) {
        self.owner.store(0, Ordering::Relaxed);
        // SAFETY: either ownership was verified, or the unchecked policy makes
        // holding the lock the caller's responsibility. The state word is the
        // only data this mutex guards.
        unsafe { self.raw.unlock() };
    }
}

impl Drop for OwnedMutex {
    fn drop(&mut self) {
        if self.checks.contains(SyncChecks::DROP_WHILE_HELD) && self.raw.is_locked() {
            let error = Error::DestroyedWhileHeld(self.to_string());
            self.report(error);
        }
    }
}

impl fmt::Display for OwnedMutex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name.fmt_labelled(f, self.kind, self)
    }
}
