//! Per-thread identity used for lock ownership

use std::cell::Cell;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_ID: AtomicUsize = AtomicUsize::new(1);

thread_local! {
    // 0 until the thread first asks for its id.
    static ID: Cell<usize> = const { Cell::new(0) };
}

fn fresh_id() -> NonZeroUsize {
    loop {
        // Skips 0 should the counter ever wrap.
        if let Some(id) = NonZeroUsize::new(NEXT_ID.fetch_add(1, Ordering::Relaxed)) {
            return id;
        }
    }
}

/// Returns a non-zero id for the calling thread.
///
/// Ids are handed out from a process-wide counter on first use and never
/// reused, so a thread spawned after another exits cannot inherit its
/// ownership of a lock.
#[inline]
pub fn current() -> NonZeroUsize {
    ID.with(|slot| match NonZeroUsize::new(slot.get()) {
        Some(id) => id,
        None => {
            let id = fresh_id();
            slot.set(id.get());
            id
        }
    })
}
