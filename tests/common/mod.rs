//! Common test utilities
//!
//! Suite bookkeeping, assertion macros and the harness logger.

use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use log::{LevelFilter, Log, Metadata, Record};

/// Environment variable selecting the harness log level
pub const LOG_ENV: &str = "FDN_LOG";

/// Outcome of a single test case
pub type CaseResult = Result<(), String>;

/// A named test case
pub type Case = (&'static str, fn() -> CaseResult);

/// Test result
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestResult {
    /// Number of tests passed
    pub passed: usize,
    /// Total number of tests
    pub total: usize,
}

impl TestResult {
    /// Create a new test result
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a test result with values
    pub fn with_values(passed: usize, total: usize) -> Self {
        Self { passed, total }
    }

    /// Check if all tests passed
    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }

    /// Get pass rate
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.passed as f64 / self.total as f64
        }
    }

    /// Add another result into this one
    pub fn merge(&mut self, other: &TestResult) {
        self.passed += other.passed;
        self.total += other.total;
    }
}

/// Fails the current case with a message unless `$condition` holds
#[macro_export]
macro_rules! check {
    ($condition:expr, $message:expr) => {
        if !($condition) {
            return Err(format!("{} ({})", $message, stringify!($condition)));
        }
    };
}

/// Fails the current case unless both sides are equal
#[macro_export]
macro_rules! check_eq {
    ($left:expr, $right:expr, $message:expr) => {
        // `match` keeps temporaries in both operands alive for the comparison.
        match (&$left, &$right) {
            (left, right) => {
                if left != right {
                    return Err(format!(
                        "{} (expected: {:?}, got: {:?})",
                        $message, right, left
                    ));
                }
            }
        }
    };
}

/// Runs every case of a suite, counting panics as failures
pub fn run_cases(suite: &str, cases: &[Case]) -> TestResult {
    let mut result = TestResult::new();
    for (name, case) in cases {
        result.total += 1;
        let started = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(*case)).unwrap_or_else(|payload| {
            let message = payload
                .downcast_ref::<String>()
                .cloned()
                .or_else(|| payload.downcast_ref::<&str>().map(|s| s.to_string()))
                .unwrap_or_else(|| "panic".to_string());
            Err(format!("panicked: {}", message))
        });
        match outcome {
            Ok(()) => {
                result.passed += 1;
                log::debug!("{}::{} ok ({:?})", suite, name, started.elapsed());
            }
            Err(message) => log::error!("{}::{} FAILED: {}", suite, name, message),
        }
    }
    log::info!("{}: {}/{} passed", suite, result.passed, result.total);
    result
}

/// Polls `done` until it returns true or `limit` passes
pub fn wait_for(limit: Duration, mut done: impl FnMut() -> bool) -> bool {
    let started = Instant::now();
    while !done() {
        if started.elapsed() > limit {
            return false;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    true
}

/// Logger writing timestamped lines to stderr
pub struct HarnessLogger {
    started: Instant,
    lines: AtomicUsize,
}

static LOGGER: spin::Once<HarnessLogger> = spin::Once::new();

impl HarnessLogger {
    /// Lines written so far
    pub fn lines(&self) -> usize {
        self.lines.load(Ordering::Relaxed)
    }
}

impl Log for HarnessLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        self.lines.fetch_add(1, Ordering::Relaxed);
        let elapsed = self.started.elapsed();
        let mut err = std::io::stderr().lock();
        let _ = writeln!(
            err,
            "[{:>4}.{:03}] {:<5} {}: {}",
            elapsed.as_secs(),
            elapsed.subsec_millis(),
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Parses `FDN_LOG` style levels; `None` for unknown names
pub fn parse_level(value: &str) -> Option<LevelFilter> {
    match value.trim().to_ascii_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// Installs the harness logger once; later calls only adjust the level
pub fn init_logging(level: LevelFilter) -> &'static HarnessLogger {
    let logger = LOGGER.call_once(|| HarnessLogger {
        started: Instant::now(),
        lines: AtomicUsize::new(0),
    });
    // Another logger may already be installed by the embedding process.
    let _ = log::set_logger(logger);
    log::set_max_level(level);
    logger
}

/// Level from `FDN_LOG`, defaulting to `info`
pub fn level_from_env() -> LevelFilter {
    match std::env::var(LOG_ENV) {
        Ok(value) => parse_level(&value).unwrap_or_else(|| {
            eprintln!("{}: unknown level '{}', using info", LOG_ENV, value);
            LevelFilter::Info
        }),
        Err(_) => LevelFilter::Info,
    }
}

/// Flushes the harness logger if it is installed
pub fn flush_logging() {
    if let Some(logger) = LOGGER.get() {
        logger.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passing() -> CaseResult {
        check!(1 + 1 == 2, "arithmetic");
        Ok(())
    }

    fn failing() -> CaseResult {
        check_eq!(1 + 1, 3, "arithmetic");
        Ok(())
    }

    fn panicking() -> CaseResult {
        panic!("boom");
    }

    fn compares_temporaries() -> CaseResult {
        let name: Option<std::sync::Arc<str>> = Some("worker".into());
        check_eq!(name.clone().as_deref(), Some("worker"), "borrowed from a temporary");
        check_eq!(String::from("a") + "b", "ab".to_string(), "owned temporaries");
        Ok(())
    }

    #[test]
    fn test_check_eq_accepts_temporaries() {
        assert_eq!(compares_temporaries(), Ok(()));
        assert!(failing().is_err_and(|message| message.contains("expected: 3, got: 2")));
    }

    #[test]
    fn test_run_cases_counts_failures_and_panics() {
        let result = run_cases(
            "self",
            &[("passing", passing), ("failing", failing), ("panicking", panicking)],
        );
        assert_eq!(result, TestResult::with_values(1, 3));
        assert!(!result.all_passed());
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("Trace"), Some(LevelFilter::Trace));
        assert_eq!(parse_level(" off "), Some(LevelFilter::Off));
        assert_eq!(parse_level("loud"), None);
    }

    #[test]
    fn test_merge_and_rate() {
        let mut result = TestResult::with_values(1, 2);
        result.merge(&TestResult::with_values(3, 3));
        assert_eq!(result, TestResult::with_values(4, 5));
        assert!((result.pass_rate() - 0.8).abs() < f64::EPSILON);
        assert_eq!(TestResult::new().pass_rate(), 1.0);
    }
}
