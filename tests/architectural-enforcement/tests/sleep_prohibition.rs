//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT call sleep methods. Countdowns are
//! driven by `tokio::time::interval` or wall-clock deltas.
//! **Exceptions**: frame pacing in the TUI event loop, the replay hold after
//! the transcript ends, test code.

use std::path::Path;

use architectural_enforcement::{find_violations, report};

fn is_sleep(code: &str) -> bool {
    code.contains("::sleep(") || code.contains(".sleep(")
}

fn allowed(path: &Path, code: &str) -> bool {
    let lower = code.to_lowercase();
    (path.ends_with("tui/src/app.rs") && lower.contains("frame"))
        || (path.ends_with("display/replay/src/main.rs") && lower.contains("hold"))
}

#[test]
fn test_no_sleep_in_core() {
    let violations = find_violations("display/core/src", |_, code| is_sleep(code));
    report(
        "Sleep call in display core. Use tokio::time::interval or a tick.",
        &violations,
    );
}

#[test]
fn test_no_sleep_in_surfaces() {
    let mut violations = find_violations("tui/src", |path, code| {
        is_sleep(code) && !allowed(path, code)
    });
    violations.extend(find_violations("display/replay/src", |path, code| {
        is_sleep(code) && !allowed(path, code)
    }));
    report(
        "Sleep call in surface code outside frame pacing.",
        &violations,
    );
}

#[test]
fn test_no_blocking_thread_sleep_anywhere() {
    let mut violations = Vec::new();
    for dir in ["display/core/src", "display/replay/src", "tui/src"] {
        violations.extend(find_violations(dir, |_, code| {
            code.contains("std::thread::sleep") || code.contains("thread::sleep(")
        }));
    }
    report("Blocking thread sleep in async code.", &violations);
}
