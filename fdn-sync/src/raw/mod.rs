//! Native primitives
//!
//! Thin wrappers over address-keyed thread parking. They carry no names,
//! statistics or misuse checks; the composed lock types add those.

pub mod condvar;
pub mod mutex;
pub mod recursive;

pub use condvar::NativeCondvar;
pub use mutex::NativeMutex;
pub use recursive::NativeRecursiveMutex;
