//! Recursive lock tests

use std::thread;

use fdn_sync::{Deadline, LockAttributes, RecursiveLock, SyncChecks};

use crate::common::{run_cases, Case, CaseResult, TestResult};

const CASES: &[Case] = &[
    ("depth_tracking", test_depth_tracking),
    ("held_until_unwound", test_held_until_unwound),
    ("owner_try_lock", test_owner_try_lock),
    ("owner_ignores_deadline", test_owner_ignores_deadline),
    ("non_owner_unlock", test_non_owner_unlock),
];

/// Run the recursive lock suite
pub fn run_tests() -> TestResult {
    run_cases("recursive_lock_tests", CASES)
}

fn other_thread_can_take(lock: &RecursiveLock) -> bool {
    thread::scope(|s| {
        s.spawn(|| {
            let ok = lock.try_lock();
            if ok {
                lock.unlock();
            }
            ok
        })
        .join()
        .unwrap_or(false)
    })
}

fn test_depth_tracking() -> CaseResult {
    let lock = RecursiveLock::new();
    for expected in 1..=8 {
        lock.lock();
        check_eq!(lock.depth(), expected, "depth after lock");
    }
    for expected in (0..8).rev() {
        lock.unlock();
        check_eq!(lock.depth(), expected, "depth after unlock");
    }
    check!(!lock.is_locked(), "lock held after unwinding");
    Ok(())
}

fn test_held_until_unwound() -> CaseResult {
    let lock = RecursiveLock::named("nested");
    lock.lock();
    lock.lock();
    lock.lock();
    for _ in 0..3 {
        check!(!other_thread_can_take(&lock), "another thread took a held lock");
        lock.unlock();
    }
    check!(other_thread_can_take(&lock), "lock not available after final unlock");
    Ok(())
}

fn test_owner_try_lock() -> CaseResult {
    let lock = RecursiveLock::new();
    lock.lock();
    for _ in 0..4 {
        check!(lock.try_lock(), "owner try_lock failed");
    }
    check_eq!(lock.depth(), 5, "depth");
    for _ in 0..5 {
        lock.unlock();
    }
    check!(other_thread_can_take(&lock), "lock not released");
    Ok(())
}

fn test_owner_ignores_deadline() -> CaseResult {
    let lock = RecursiveLock::new();
    lock.lock();
    let reentered = lock.lock_before(Deadline::distant_past());
    let depth = lock.depth();
    while lock.is_held_by_current_thread() {
        lock.unlock();
    }
    check!(reentered, "owner lock_before failed on a past deadline");
    check_eq!(depth, 2, "depth");
    Ok(())
}

fn test_non_owner_unlock() -> CaseResult {
    let lock = RecursiveLock::with_attributes(
        LockAttributes::default().with_checks(SyncChecks::OWNERSHIP),
    );
    lock.lock();
    let refused = thread::scope(|s| {
        s.spawn(|| {
            lock.unlock();
            lock.try_unlock().is_err()
        })
        .join()
        .unwrap_or(false)
    });
    let depth = lock.depth();
    lock.unlock();
    check!(refused, "non-owner try_unlock succeeded");
    check_eq!(depth, 1, "depth after refused unlocks");
    check_eq!(lock.stats().misuse_reports, 1, "misuse reports");
    Ok(())
}
