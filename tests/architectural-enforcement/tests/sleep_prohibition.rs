//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT sleep. Reversions are deadlines the
//! engine hands to the driver; the driver waits with `sleep_until` on the
//! earliest one, and periodic work uses `tokio::time::interval`.
//!
//! **Exceptions**: test code (anything after `#[cfg(test)]`, and `tests/`).

use architectural_enforcement::find_violations;

const PRODUCTION_DIRS: &[&str] = &["pet/core/src", "pet/hook/src", "tui/src"];

#[test]
fn test_no_sleep_in_production_code() {
    let violations = find_violations(
        PRODUCTION_DIRS,
        &["::sleep(", ".sleep(", "thread::sleep"],
    );

    if !violations.is_empty() {
        eprintln!("\nSleep calls found in production code:");
        for violation in &violations {
            eprintln!("  {violation}");
        }
        eprintln!("\nWait on I/O, a deadline (sleep_until) or an interval instead.");

        panic!(
            "\nFound {} sleep violation(s) in production code.",
            violations.len()
        );
    }
}

#[test]
fn test_engine_spawns_no_timers() {
    // The engine only computes deadlines; the driver owns the waiting
    let violations = find_violations(&["pet/core/src"], &["sleep_until(", "tokio::time::interval("]);
    assert!(
        violations.is_empty(),
        "Timer calls in the engine:\n{}",
        violations.join("\n")
    );
}
