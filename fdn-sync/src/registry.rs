//! Handle registry
//!
//! Owns primitives on behalf of callers that cannot hold an `Arc`
//! themselves and gives every primitive an explicit teardown point:
//! [`LockRegistry::destroy`] refuses to drop a primitive that is held or
//! still referenced elsewhere, since a thread may be blocked inside it.

use std::fmt;
use std::num::NonZeroU64;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use fdn_api::{Deadline, Error, Locking, Named, Result, TimedLocking};
use hashbrown::HashMap;
use lazy_static::lazy_static;
use spin::Mutex;

use crate::attr::LockAttributes;
use crate::condition::Condition;
use crate::condition_lock::ConditionLock;
use crate::config;
use crate::lock::Lock;
use crate::recursive_lock::RecursiveLock;

/// Opaque identifier of a registered primitive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LockHandle(NonZeroU64);

impl LockHandle {
    /// Raw id, never zero
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for LockHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A registered primitive of any kind
#[derive(Debug, Clone)]
pub enum Primitive {
    Lock(Arc<Lock>),
    RecursiveLock(Arc<RecursiveLock>),
    Condition(Arc<Condition>),
    ConditionLock(Arc<ConditionLock>),
}

macro_rules! dispatch {
    ($self:expr, $p:ident => $body:expr) => {
        match $self {
            Primitive::Lock($p) => $body,
            Primitive::RecursiveLock($p) => $body,
            Primitive::Condition($p) => $body,
            Primitive::ConditionLock($p) => $body,
        }
    };
}

impl Primitive {
    /// Kind name, as used in descriptions
    pub fn kind(&self) -> &'static str {
        match self {
            Primitive::Lock(_) => "Lock",
            Primitive::RecursiveLock(_) => "RecursiveLock",
            Primitive::Condition(_) => "Condition",
            Primitive::ConditionLock(_) => "ConditionLock",
        }
    }

    pub fn is_locked(&self) -> bool {
        dispatch!(self, p => p.is_locked())
    }

    pub fn as_lock(&self) -> Option<&Arc<Lock>> {
        match self {
            Primitive::Lock(lock) => Some(lock),
            _ => None,
        }
    }

    pub fn as_recursive_lock(&self) -> Option<&Arc<RecursiveLock>> {
        match self {
            Primitive::RecursiveLock(lock) => Some(lock),
            _ => None,
        }
    }

    pub fn as_condition(&self) -> Option<&Arc<Condition>> {
        match self {
            Primitive::Condition(condition) => Some(condition),
            _ => None,
        }
    }

    pub fn as_condition_lock(&self) -> Option<&Arc<ConditionLock>> {
        match self {
            Primitive::ConditionLock(lock) => Some(lock),
            _ => None,
        }
    }

    fn strong_count(&self) -> usize {
        dispatch!(self, p => Arc::strong_count(p))
    }
}

impl Locking for Primitive {
    fn lock(&self) {
        dispatch!(self, p => p.lock())
    }

    fn unlock(&self) {
        dispatch!(self, p => p.unlock())
    }
}

impl TimedLocking for Primitive {
    fn try_lock(&self) -> bool {
        dispatch!(self, p => p.try_lock())
    }

    fn lock_before(&self, deadline: Deadline) -> bool {
        dispatch!(self, p => p.lock_before(deadline))
    }
}

impl Named for Primitive {
    fn name(&self) -> Option<Arc<str>> {
        dispatch!(self, p => p.name())
    }

    fn set_name(&self, name: Option<&str>) {
        dispatch!(self, p => p.set_name(name))
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dispatch!(self, p => fmt::Display::fmt(&**p, f))
    }
}

/// Registry of live primitives, bounded by a capacity
pub struct LockRegistry {
    entries: Mutex<HashMap<LockHandle, Primitive>>,
    next_id: AtomicU64,
    capacity: usize,
}

impl LockRegistry {
    /// Empty registry sized from the process-wide configuration
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            capacity: config::config().registry_capacity,
        }
    }

    /// Empty registry holding at most `capacity` primitives
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidArgument(
                "registry capacity must be positive".into(),
            ));
        }
        Ok(Self {
            entries: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn create_lock(&self, attrs: LockAttributes) -> Result<LockHandle> {
        self.insert(|| Primitive::Lock(Arc::new(Lock::with_attributes(attrs))))
    }

    pub fn create_recursive_lock(&self, attrs: LockAttributes) -> Result<LockHandle> {
        self.insert(|| Primitive::RecursiveLock(Arc::new(RecursiveLock::with_attributes(attrs))))
    }

    pub fn create_condition(&self, attrs: LockAttributes) -> Result<LockHandle> {
        self.insert(|| Primitive::Condition(Arc::new(Condition::with_attributes(attrs))))
    }

    pub fn create_condition_lock(
        &self,
        condition: isize,
        attrs: LockAttributes,
    ) -> Result<LockHandle> {
        self.insert(|| {
            Primitive::ConditionLock(Arc::new(ConditionLock::with_attributes(condition, attrs)))
        })
    }

    /// Shared reference to a registered primitive
    pub fn get(&self, handle: LockHandle) -> Result<Primitive> {
        self.entries
            .lock()
            .get(&handle)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("lock handle {}", handle)))
    }

    /// Acquires the primitive behind `handle` and runs `f` while holding
    /// it. Fails with `Timeout` if `deadline` passes first.
    pub fn with_locked<R>(
        &self,
        handle: LockHandle,
        deadline: Deadline,
        f: impl FnOnce(&Primitive) -> R,
    ) -> Result<R> {
        let primitive = self.get(handle)?;
        match fdn_api::acquire_before(&primitive, deadline) {
            Some(_guard) => Ok(f(&primitive)),
            None => Err(Error::Timeout),
        }
    }

    /// Removes and drops the primitive behind `handle`.
    ///
    /// Fails with `Busy`, keeping the entry, while the primitive is held or
    /// referenced outside the registry.
    pub fn destroy(&self, handle: LockHandle) -> Result<()> {
        let mut entries = self.entries.lock();
        let primitive = entries
            .get(&handle)
            .ok_or_else(|| Error::NotFound(format!("lock handle {}", handle)))?;
        if primitive.is_locked() {
            return Err(Error::Busy(format!("{} {} is held", primitive, handle)));
        }
        if primitive.strong_count() > 1 {
            return Err(Error::Busy(format!("{} {} is still referenced", primitive, handle)));
        }
        let removed = entries.remove(&handle);
        drop(entries);
        log::debug!("lock registry: destroyed {}", handle);
        drop(removed);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Handles of all live primitives, in creation order
    pub fn handles(&self) -> Vec<LockHandle> {
        let mut handles: Vec<LockHandle> = self.entries.lock().keys().copied().collect();
        handles.sort_unstable();
        handles
    }

    /// Drops every entry; returns how many were removed
    pub fn clear(&self) -> usize {
        let drained: Vec<Primitive> = self.entries.lock().drain().map(|(_, p)| p).collect();
        let count = drained.len();
        if count > 0 {
            log::debug!("lock registry: cleared {} entries", count);
        }
        count
    }

    fn insert(&self, make: impl FnOnce() -> Primitive) -> Result<LockHandle> {
        let mut entries = self.entries.lock();
        if entries.len() >= self.capacity {
            return Err(Error::ResourceExhausted(format!(
                "lock registry is full ({} entries)",
                self.capacity
            )));
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let handle = NonZeroU64::new(id)
            .map(LockHandle)
            .ok_or_else(|| Error::ResourceExhausted("lock handle ids exhausted".into()))?;
        let primitive = make();
        log::debug!("lock registry: created {} {}", primitive.kind(), handle);
        entries.insert(handle, primitive);
        Ok(handle)
    }
}

impl Default for LockRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LockRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockRegistry")
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .finish()
    }
}

lazy_static! {
    static ref GLOBAL_REGISTRY: LockRegistry = LockRegistry::new();
}

/// Process-wide registry
pub fn global() -> &'static LockRegistry {
    &GLOBAL_REGISTRY
}
