//! Integration Test: Headless Core
//!
//! **Policy**: `display/core` renders onto any surface through `MountPoint`.
//! It MUST NOT depend on terminal, CLI or logging-subscriber crates, and its
//! production code MUST propagate errors rather than panic.

use architectural_enforcement::{find_violations, report};

const SURFACE_CRATES: &[&str] = &[
    "ratatui",
    "crossterm",
    "clap",
    "tracing_subscriber",
    "anyhow",
];

#[test]
fn test_core_has_no_surface_dependencies() {
    let violations = find_violations("display/core/src", |_, code| {
        SURFACE_CRATES
            .iter()
            .any(|krate| code.contains(&format!("{krate}::")))
    });
    report(
        "Display core imports a surface-only crate. Move this code to a surface.",
        &violations,
    );
}

#[test]
fn test_core_does_not_panic_on_input() {
    let violations = find_violations("display/core/src", |_, code| {
        code.contains(".unwrap()")
            || code.contains(".expect(")
            || code.contains("panic!(")
            || code.contains("unreachable!(")
    });
    report(
        "Panicking call in display core production code. Return an error instead.",
        &violations,
    );
}

#[test]
fn test_core_does_not_print() {
    let violations = find_violations("display/core/src", |_, code| {
        code.contains("println!(") || code.contains("eprintln!(")
    });
    report(
        "Direct printing in display core. Use tracing instead.",
        &violations,
    );
}

#[test]
fn test_only_registry_mutates_timer_state() {
    // `start` is crate-private; only the registry may begin a countdown
    let violations = find_violations("display/core/src", |path, code| {
        code.contains(".start(")
            && !path.ends_with("registry.rs")
            && !path.ends_with("timer.rs")
    });
    report(
        "Countdown started outside the widget registry.",
        &violations,
    );
}
