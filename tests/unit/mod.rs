//! Unit test module
//!
//! One suite per primitive, exercising its contract from a few threads.

pub mod condition_tests;
pub mod recursive_lock_tests;

use crate::common::TestResult;

/// Run all unit tests
///
/// # Returns
/// * `TestResult` - Unit test result
pub fn run_unit_tests() -> TestResult {
    let mut result = TestResult::new();

    let suites = [
        ("lock_tests", lock_tests::run_tests as fn() -> TestResult),
        ("recursive_lock_tests", recursive_lock_tests::run_tests),
        ("condition_tests", condition_tests::run_tests),
        ("condition_lock_tests", condition_lock_tests::run_tests),
    ];

    for (name, run_suite) in suites {
        log::info!("  Running {}...", name);
        result.merge(&run_suite());
    }

    result
}
