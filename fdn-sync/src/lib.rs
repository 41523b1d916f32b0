//! FDN Sync - Foundation locking primitives over native thread parking
//!
//! Implements the four Foundation lock types with their exact contracts:
//!
//! - [`Lock`]: non-recursive mutual exclusion (`NSLock`)
//! - [`RecursiveLock`]: re-entrant for the owning thread (`NSRecursiveLock`)
//! - [`Condition`]: lock plus condition variable (`NSCondition`)
//! - [`ConditionLock`]: lock gated on an integer condition (`NSConditionLock`)
//!
//! All of them implement [`fdn_api::Locking`], [`fdn_api::TimedLocking`] and
//! [`fdn_api::Named`], so they work with the scoped guards in `fdn_api`.
//!
//! # Architecture
//!
//! - **Raw**: native mutex, recursive mutex and condition variable built on
//!   `parking_lot_core`. Releasing the mutex and blocking on the condition
//!   variable happen as one step, so wakeups cannot be lost.
//! - **Lock types**: owner tracking, misuse checks, names and statistics on
//!   top of the raw layer.
//! - **Registry**: handle based ownership with an explicit teardown point.
//! - **Config**: process-wide misuse checks and limits.
//!
//! # Usage
//!
//! ```rust
//! use fdn_sync::{ConditionLock, Lock};
//! use fdn_api::with_lock;
//!
//! let lock = Lock::named("counter");
//! let total = with_lock(&lock, || 40 + 2);
//! assert_eq!(total, 42);
//! assert!(!lock.is_locked());
//!
//! let stage = ConditionLock::new(0);
//! std::thread::scope(|s| {
//!     s.spawn(|| {
//!         stage.lock_when_condition(1);
//!         stage.unlock_with_condition(2);
//!     });
//!     stage.lock();
//!     stage.unlock_with_condition(1);
//!     stage.lock_when_condition(2);
//!     stage.unlock();
//! });
//! ```

pub mod attr;
pub mod condition;
pub mod condition_lock;
pub mod config;
pub mod lock;
pub mod misuse;
pub mod name;
mod owned;
pub mod raw;
pub mod recursive_lock;
pub mod registry;
pub mod stats;
pub mod thread_id;

// Re-export commonly used types
pub use crate::attr::LockAttributes;
pub use crate::condition::Condition;
pub use crate::condition_lock::ConditionLock;
pub use crate::config::{SyncChecks, SyncConfig};
pub use crate::lock::Lock;
pub use crate::recursive_lock::RecursiveLock;
pub use crate::registry::{LockHandle, LockRegistry, Primitive};
pub use crate::stats::LockStatsSnapshot;
pub use fdn_api::{Deadline, Error, Result};

static_assertions::assert_impl_all!(Lock: Send, Sync);
static_assertions::assert_impl_all!(RecursiveLock: Send, Sync);
static_assertions::assert_impl_all!(Condition: Send, Sync);
static_assertions::assert_impl_all!(ConditionLock: Send, Sync);
static_assertions::assert_impl_all!(LockRegistry: Send, Sync);
static_assertions::assert_impl_all!(Primitive: Send, Sync, Clone);
