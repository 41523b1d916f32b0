//! Misuse reporting
//!
//! Unlocking from a non-owner, re-locking a non-recursive lock and dropping
//! a held primitive are caller bugs. They are always logged; with
//! [`SyncChecks::PANIC_ON_MISUSE`] they also panic.

use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use fdn_api::Error;

use crate::config::SyncChecks;

static MISUSE_REPORTS: AtomicU64 = AtomicU64::new(0);

/// Logs `error` and panics if `checks` ask for it
#[track_caller]
pub fn report(checks: SyncChecks, error: Error) {
    MISUSE_REPORTS.fetch_add(1, Ordering::Relaxed);
    log::error!("lock misuse: {}", error);
    // A second panic while unwinding would abort the process.
    if checks.contains(SyncChecks::PANIC_ON_MISUSE) && !thread::panicking() {
        panic!("lock misuse: {}", error);
    }
}

/// Number of misuse reports since process start
pub fn report_count() -> u64 {
    MISUSE_REPORTS.load(Ordering::Relaxed)
}
