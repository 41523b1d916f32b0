//! Core types used throughout the sync layer

use std::fmt;
use std::time::{Duration, Instant, SystemTime};

/// Absolute point in time bounding a blocking operation.
///
/// Deadlines are absolute, not durations: the same deadline can be handed to
/// several operations in a row and they all stop at the same moment. A
/// deadline that is too far away to be represented never expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Deadline {
    instant: Option<Instant>,
}

impl Deadline {
    /// Deadline at a monotonic instant
    pub const fn at(instant: Instant) -> Self {
        Self {
            instant: Some(instant),
        }
    }

    /// Deadline `timeout` from now
    pub fn after(timeout: Duration) -> Self {
        Self {
            instant: Instant::now().checked_add(timeout),
        }
    }

    /// Converts a wall-clock date into a monotonic deadline.
    ///
    /// The wall clock is sampled once, so later adjustments of the system
    /// clock do not move the deadline.
    pub fn from_system_time(date: SystemTime) -> Self {
        let now = Instant::now();
        match date.duration_since(SystemTime::now()) {
            Ok(ahead) => Self {
                instant: now.checked_add(ahead),
            },
            Err(err) => Self {
                instant: Some(now.checked_sub(err.duration()).unwrap_or(now)),
            },
        }
    }

    /// A deadline that never expires
    pub const fn distant_future() -> Self {
        Self { instant: None }
    }

    /// A deadline that has already expired
    pub fn distant_past() -> Self {
        Self::at(Instant::now())
    }

    /// Returns the instant this deadline expires at, `None` if it never does
    pub fn instant(&self) -> Option<Instant> {
        self.instant
    }

    /// Returns true once the deadline has passed
    pub fn has_expired(&self) -> bool {
        match self.instant {
            Some(instant) => Instant::now() >= instant,
            None => false,
        }
    }

    /// Time left until expiry, `None` for a deadline that never expires
    pub fn remaining(&self) -> Option<Duration> {
        self.instant
            .map(|instant| instant.saturating_duration_since(Instant::now()))
    }
}

impl From<Instant> for Deadline {
    fn from(instant: Instant) -> Self {
        Self::at(instant)
    }
}

impl From<SystemTime> for Deadline {
    fn from(date: SystemTime) -> Self {
        Self::from_system_time(date)
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.remaining() {
            Some(left) => write!(f, "deadline in {:?}", left),
            None => write!(f, "no deadline"),
        }
    }
}
