//! Construction attributes shared by all lock types

use crate::config::{self, SyncChecks};

/// Attributes applied when a primitive is created
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockAttributes {
    /// Diagnostic name
    pub name: Option<String>,
    /// Misuse checks; `None` takes them from the process-wide config
    pub checks: Option<SyncChecks>,
}

impl LockAttributes {
    /// Attributes carrying only a name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            checks: None,
        }
    }

    /// Set explicit misuse checks
    pub fn with_checks(mut self, checks: SyncChecks) -> Self {
        self.checks = Some(checks);
        self
    }

    pub(crate) fn resolved_checks(&self) -> SyncChecks {
        self.checks.unwrap_or_else(|| config::config().checks)
    }
}
