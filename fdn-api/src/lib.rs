//! FDN API - Core interfaces and types for the Foundation sync layer
//!
//! This crate provides the interfaces shared by every locking primitive of the
//! Foundation compatibility layer, together with the deadline and error types
//! their operations use.
//!
//! # Architecture
//!
//! - **Core**: the `NSLocking` capability traits, scoped guards and deadlines
//! - **Error**: common error type and result alias
//!
//! # Usage
//!
//! ```rust
//! use fdn_api::{Deadline, Locking, with_lock};
//! use std::sync::Mutex;
//! use std::time::Duration;
//!
//! struct Flag(Mutex<bool>);
//!
//! impl Locking for Flag {
//!     fn lock(&self) {
//!         *self.0.lock().unwrap() = true;
//!     }
//!     fn unlock(&self) {
//!         *self.0.lock().unwrap() = false;
//!     }
//! }
//!
//! let flag = Flag(Mutex::new(false));
//! let held = with_lock(&flag, || *flag.0.lock().unwrap());
//! assert!(held);
//! assert!(!Deadline::after(Duration::from_secs(1)).has_expired());
//! ```

pub mod core;
pub mod error;

// Re-export commonly used types
pub use crate::core::guard::{acquire, acquire_before, try_acquire, with_lock, LockGuard};
pub use crate::core::traits::{Locking, Named, TimedLocking};
pub use crate::core::types::Deadline;
pub use crate::error::{Error, Result};
