//! Per-primitive statistics

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by a primitive as it is used
#[derive(Debug, Default)]
pub struct LockStats {
    acquisitions: AtomicU64,
    contended: AtomicU64,
    timeouts: AtomicU64,
    waits: AtomicU64,
    misuse_reports: AtomicU64,
}

/// Point-in-time copy of [`LockStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LockStatsSnapshot {
    /// Successful acquisitions, recursive re-entries included
    pub acquisitions: u64,
    /// Acquisitions that found the lock held and had to wait
    pub contended: u64,
    /// Deadline-bounded lock or wait operations that timed out
    pub timeouts: u64,
    /// Condition waits started
    pub waits: u64,
    /// Misuse reports raised against this primitive
    pub misuse_reports: u64,
}

impl LockStats {
    /// Create zeroed counters
    pub const fn new() -> Self {
        Self {
            acquisitions: AtomicU64::new(0),
            contended: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            waits: AtomicU64::new(0),
            misuse_reports: AtomicU64::new(0),
        }
    }

    pub(crate) fn record_acquire(&self, contended: bool) {
        self.acquisitions.fetch_add(1, Ordering::Relaxed);
        if contended {
            self.contended.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub(crate) fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_wait(&self) {
        self.waits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_misuse(&self) {
        self.misuse_reports.fetch_add(1, Ordering::Relaxed);
    }

    /// Copy the current counters
    pub fn snapshot(&self) -> LockStatsSnapshot {
        LockStatsSnapshot {
            acquisitions: self.acquisitions.load(Ordering::Relaxed),
            contended: self.contended.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            waits: self.waits.load(Ordering::Relaxed),
            misuse_reports: self.misuse_reports.load(Ordering::Relaxed),
        }
    }
}
