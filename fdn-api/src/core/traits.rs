//! Capability traits implemented by every locking primitive

use std::sync::Arc;

use super::types::Deadline;

/// The `NSLocking` capability: a primitive that can be locked and unlocked.
///
/// Lock and unlock are not tied to a scope. A caller that wants release on
/// every exit path uses [`crate::LockGuard`] instead of pairing the calls by
/// hand.
#[cfg_attr(test, mockall::automock)]
pub trait Locking {
    /// Blocks the calling thread until the lock is acquired.
    fn lock(&self);

    /// Releases a lock held by the calling thread.
    ///
    /// Calling this from a thread that does not hold the lock is a
    /// programming error. Implementations report it as misuse and leave the
    /// lock state untouched.
    fn unlock(&self);
}

/// Non-blocking and deadline-bounded acquisition.
pub trait TimedLocking: Locking {
    /// Attempts to acquire the lock without blocking.
    fn try_lock(&self) -> bool;

    /// Blocks until the lock is acquired or `deadline` passes.
    ///
    /// A deadline that has already expired behaves exactly like
    /// [`TimedLocking::try_lock`].
    fn lock_before(&self, deadline: Deadline) -> bool;
}

/// Diagnostic name attribute. Has no effect on locking behaviour.
pub trait Named {
    /// Returns the current name, if any
    fn name(&self) -> Option<Arc<str>>;

    /// Replaces the name
    fn set_name(&self, name: Option<&str>);
}
