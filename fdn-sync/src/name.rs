//! Diagnostic name attribute

use std::fmt;
use std::sync::Arc;

use spin::RwLock;

/// Optional human readable name, readable and writable from any thread
#[derive(Debug, Default)]
pub struct LockName {
    name: RwLock<Option<Arc<str>>>,
}

impl LockName {
    /// Create a name attribute
    pub fn new(name: Option<&str>) -> Self {
        Self {
            name: RwLock::new(name.map(Arc::from)),
        }
    }

    /// Current name
    pub fn get(&self) -> Option<Arc<str>> {
        self.name.read().clone()
    }

    /// Replace the name
    pub fn set(&self, name: Option<&str>) {
        *self.name.write() = name.map(Arc::from);
    }

    /// Owned copy for error messages
    pub(crate) fn describe(&self) -> Option<String> {
        self.name.read().as_deref().map(str::to_owned)
    }

    /// Writes `<Kind: 0xaddr>{name = ...}`
    pub(crate) fn fmt_labelled<T>(
        &self,
        f: &mut fmt::Formatter<'_>,
        kind: &str,
        owner: &T,
    ) -> fmt::Result {
        write!(f, "<{}: {:p}>{{name = ", kind, owner)?;
        match self.get() {
            Some(name) => write!(f, "{}}}", name),
            None => write!(f, "(null)}}"),
        }
    }
}
