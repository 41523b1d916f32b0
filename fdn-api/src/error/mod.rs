//! Error handling module for the Foundation sync layer

use std::fmt;

/// Common error type used throughout the sync layer
///
/// Timeouts on deadline-bounded lock operations are not errors; those
/// operations return `false`. `Timeout` exists for callers that want to turn
/// such an outcome into a `Result`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Unlock or wait by a thread that does not hold the lock
    NotOwner {
        /// Operation that was refused
        operation: &'static str,
        /// Diagnostic name of the lock, if any
        lock: Option<String>,
    },
    /// Re-acquisition of a non-recursive lock by its owner
    WouldDeadlock {
        /// Diagnostic name of the lock, if any
        lock: Option<String>,
    },
    /// A primitive was dropped while still held
    DestroyedWhileHeld(String),
    /// Resource busy
    Busy(String),
    /// Resource not found
    NotFound(String),
    /// A primitive could not be created
    ResourceExhausted(String),
    /// Invalid argument
    InvalidArgument(String),
    /// Configuration error
    ConfigError(String),
    /// Timeout
    Timeout,
}

impl Error {
    /// Returns true for caller programming errors (as opposed to runtime
    /// conditions such as exhaustion or timeouts)
    pub fn is_misuse(&self) -> bool {
        matches!(
            self,
            Error::NotOwner { .. } | Error::WouldDeadlock { .. } | Error::DestroyedWhileHeld(_)
        )
    }
}

fn describe(lock: &Option<String>) -> &str {
    lock.as_deref().unwrap_or("unnamed lock")
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotOwner { operation, lock } => write!(
                f,
                "Not owner: {} on {} from a thread that does not hold it",
                operation,
                describe(lock)
            ),
            Error::WouldDeadlock { lock } => {
                write!(f, "Deadlock: {} is already held by this thread", describe(lock))
            }
            Error::DestroyedWhileHeld(msg) => write!(f, "Destroyed while held: {}", msg),
            Error::Busy(msg) => write!(f, "Resource busy: {}", msg),
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
            Error::ResourceExhausted(msg) => write!(f, "Resource exhausted: {}", msg),
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Error::Timeout => write!(f, "Operation timed out"),
        }
    }
}

impl std::error::Error for Error {}

/// Result type for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Error context trait for adding context to errors
pub trait ErrorContext<T> {
    /// Adds context to the error
    fn context(self, context: &str) -> Result<T>;
}

impl<T> ErrorContext<T> for Result<T> {
    fn context(self, context: &str) -> Result<T> {
        self.map_err(|error| match error {
            Error::ConfigError(msg) => Error::ConfigError(format!("{}: {}", context, msg)),
            Error::InvalidArgument(msg) => Error::InvalidArgument(format!("{}: {}", context, msg)),
            other => other,
        })
    }
}
