//! Condition tests

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use fdn_sync::{Condition, Deadline};

use crate::common::{run_cases, wait_for, Case, CaseResult, TestResult};

const CASES: &[Case] = &[
    ("signal", test_signal),
    ("broadcast", test_broadcast),
    ("wait_until_timeout", test_wait_until_timeout),
    ("notify_without_waiters", test_notify_without_waiters),
    ("producer_consumer", test_producer_consumer),
];

const LIMIT: Duration = Duration::from_secs(5);

/// Run the condition suite
pub fn run_tests() -> TestResult {
    run_cases("condition_tests", CASES)
}

fn test_signal() -> CaseResult {
    let condition = Condition::named("signal");
    let ready = AtomicBool::new(false);
    let held_on_return = AtomicBool::new(false);

    let arrived = thread::scope(|s| {
        s.spawn(|| {
            condition.lock();
            while !ready.load(Ordering::Relaxed) {
                condition.wait();
            }
            held_on_return.store(condition.is_held_by_current_thread(), Ordering::Relaxed);
            condition.unlock();
        });
        let arrived = wait_for(LIMIT, || condition.waiter_count() == 1);
        condition.lock();
        ready.store(true, Ordering::Relaxed);
        condition.signal();
        condition.unlock();
        arrived
    });

    check!(arrived, "waiter never blocked");
    check!(held_on_return.load(Ordering::Relaxed), "wait returned without the lock");
    Ok(())
}

fn test_broadcast() -> CaseResult {
    const WAITERS: usize = 8;
    let condition = Condition::new();
    let open = AtomicBool::new(false);
    let holders = AtomicUsize::new(0);
    let overlap = AtomicBool::new(false);
    let woken = AtomicUsize::new(0);

    let arrived = thread::scope(|s| {
        for _ in 0..WAITERS {
            s.spawn(|| {
                condition.lock();
                while !open.load(Ordering::Relaxed) {
                    condition.wait();
                }
                if holders.fetch_add(1, Ordering::Relaxed) != 0 {
                    overlap.store(true, Ordering::Relaxed);
                }
                woken.fetch_add(1, Ordering::Relaxed);
                holders.fetch_sub(1, Ordering::Relaxed);
                condition.unlock();
            });
        }
        let arrived = wait_for(LIMIT, || condition.waiter_count() == WAITERS);
        condition.lock();
        open.store(true, Ordering::Relaxed);
        condition.broadcast();
        condition.unlock();
        arrived
    });

    check!(arrived, "waiters never blocked");
    check_eq!(woken.load(Ordering::Relaxed), WAITERS, "woken waiters");
    check!(!overlap.load(Ordering::Relaxed), "two waiters held the lock at once");
    Ok(())
}

fn test_wait_until_timeout() -> CaseResult {
    let condition = Condition::new();
    condition.lock();
    let started = Instant::now();
    let signalled = condition.wait_until(Deadline::after(Duration::from_millis(20)));
    let elapsed = started.elapsed();
    let held = condition.is_held_by_current_thread();
    condition.unlock();
    check!(!signalled, "wait_until reported a signal that never came");
    check!(elapsed >= Duration::from_millis(20), "wait_until returned early");
    check!(held, "wait_until returned without the lock");
    Ok(())
}

fn test_notify_without_waiters() -> CaseResult {
    let condition = Condition::new();
    condition.signal();
    condition.broadcast();
    check_eq!(condition.waiter_count(), 0, "waiters");
    check!(!condition.is_locked(), "notify took the lock");
    Ok(())
}

fn test_producer_consumer() -> CaseResult {
    const ITEMS: usize = 500;
    let condition = Condition::named("queue");
    let queue = spin::Mutex::new(Vec::new());
    let consumed = AtomicUsize::new(0);

    thread::scope(|s| {
        s.spawn(|| {
            for item in 0..ITEMS {
                condition.lock();
                queue.lock().push(item);
                condition.signal();
                condition.unlock();
            }
        });
        s.spawn(|| {
            let mut expected = 0;
            while expected < ITEMS {
                condition.lock();
                while queue.lock().is_empty() {
                    condition.wait();
                }
                let batch: Vec<usize> = queue.lock().drain(..).collect();
                condition.unlock();
                for item in batch {
                    if item == expected {
                        expected += 1;
                    }
                }
            }
            consumed.store(expected, Ordering::Relaxed);
        });
    });

    check_eq!(consumed.load(Ordering::Relaxed), ITEMS, "consumed items in order");
    Ok(())
}
