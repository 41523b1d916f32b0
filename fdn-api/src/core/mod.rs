//! Core module containing the locking traits, guards and deadline type

pub mod guard;
pub mod traits;
pub mod types;

// Re-export commonly used items
pub use guard::*;
pub use traits::*;
pub use types::*;
