//! Process-wide configuration
//!
//! Misuse checks and registry limits. Primitives snapshot the checks when
//! they are constructed, so changing the configuration affects primitives
//! created afterwards only.

use std::env;

use fdn_api::error::{Error, ErrorContext, Result};
use lazy_static::lazy_static;
use spin::RwLock;

/// Environment variable holding a comma separated list of checks
pub const CHECKS_ENV: &str = "FDN_SYNC_CHECKS";
/// Environment variable holding the registry capacity
pub const REGISTRY_CAPACITY_ENV: &str = "FDN_SYNC_REGISTRY_CAPACITY";

/// Default maximum number of live registry entries
pub const DEFAULT_REGISTRY_CAPACITY: usize = 65_536;

bitflags::bitflags! {
    /// Misuse checks performed by the lock types
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SyncChecks: u32 {
        /// Refuse unlock and wait from threads that do not hold the lock
        const OWNERSHIP = 0b0001;
        /// Report re-locking of a non-recursive lock by its owner
        const DEADLOCK = 0b0010;
        /// Report primitives dropped while held
        const DROP_WHILE_HELD = 0b0100;
        /// Panic on misuse instead of only logging it
        const PANIC_ON_MISUSE = 0b1000;
    }
}

impl SyncChecks {
    /// Checks used when nothing else is configured: everything in debug
    /// builds, log-only in release builds
    pub const fn build_default() -> Self {
        if cfg!(debug_assertions) {
            Self::all()
        } else {
            Self::OWNERSHIP
                .union(Self::DEADLOCK)
                .union(Self::DROP_WHILE_HELD)
        }
    }

    /// Parses `ownership,deadlock,drop,panic`, `all` or `none`
    pub fn parse(list: &str) -> Result<Self> {
        let mut checks = Self::empty();
        for item in list.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            checks |= match item.to_ascii_lowercase().as_str() {
                "all" => Self::all(),
                "none" => Self::empty(),
                "ownership" => Self::OWNERSHIP,
                "deadlock" => Self::DEADLOCK,
                "drop" | "drop_while_held" => Self::DROP_WHILE_HELD,
                "panic" | "panic_on_misuse" => Self::PANIC_ON_MISUSE,
                other => {
                    return Err(Error::ConfigError(format!("unknown check '{}'", other)));
                }
            };
        }
        Ok(checks)
    }
}

impl Default for SyncChecks {
    fn default() -> Self {
        Self::build_default()
    }
}

/// Sync layer configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncConfig {
    /// Default misuse checks for new primitives
    pub checks: SyncChecks,
    /// Maximum number of live registry entries
    pub registry_capacity: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            checks: SyncChecks::build_default(),
            registry_capacity: DEFAULT_REGISTRY_CAPACITY,
        }
    }
}

impl SyncConfig {
    /// Defaults overridden by `FDN_SYNC_CHECKS` and
    /// `FDN_SYNC_REGISTRY_CAPACITY` when they are set
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`SyncConfig::from_env`] with an explicit variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(list) = lookup(CHECKS_ENV) {
            config.checks = SyncChecks::parse(&list).context(CHECKS_ENV)?;
        }
        if let Some(capacity) = lookup(REGISTRY_CAPACITY_ENV) {
            config.registry_capacity = parse_capacity(&capacity).context(REGISTRY_CAPACITY_ENV)?;
        }
        Ok(config)
    }
}

fn parse_capacity(value: &str) -> Result<usize> {
    match value.trim().parse::<usize>() {
        Ok(0) => Err(Error::ConfigError("capacity must be positive".into())),
        Ok(capacity) => Ok(capacity),
        Err(err) => Err(Error::ConfigError(format!("'{}': {}", value, err))),
    }
}

lazy_static! {
    static ref CONFIG: RwLock<SyncConfig> = RwLock::new(SyncConfig::default());
}

/// Current process-wide configuration
pub fn config() -> SyncConfig {
    *CONFIG.read()
}

/// Replaces the process-wide configuration
pub fn set_config(config: SyncConfig) {
    log::debug!(
        "sync config: checks={:?} registry_capacity={}",
        config.checks,
        config.registry_capacity
    );
    *CONFIG.write() = config;
}
