// crates/schoolsphere-cli/tests/i18n.rs
// ============================================================================
// Module: CLI Message Catalog Tests
// Description: Exercises the message catalog and placeholder substitution.
// Purpose: Ensure CLI user-facing strings route through stable catalog keys.
// Dependencies: schoolsphere-cli i18n module and the `t!` macro.
// ============================================================================

//! ## Overview
//! - Message arguments capture key/value substitutions.
//! - Translation falls back to keys on misses.
//! - The [`t!`](schoolsphere_cli::t) macro formats placeholders correctly.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use schoolsphere_cli::i18n::MessageArg;
use schoolsphere_cli::i18n::translate;
use schoolsphere_cli::t;

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Confirms message arguments capture key/value pairs.
#[test]
fn message_arg_new_captures_key_and_value() {
    let arg = MessageArg::new("path", "backups/2026-01-01");
    assert_eq!(arg.key, "path");
    assert_eq!(arg.value, "backups/2026-01-01");
}

/// Confirms catalog entries resolve and replace placeholders.
#[test]
fn translate_substitutes_placeholders() {
    let message = translate("backup.ok", vec![MessageArg::new("path", "backups/x")]);
    assert_eq!(message, "Backup written to backups/x");
}

/// Confirms unknown keys fall back to the key itself.
#[test]
fn translate_falls_back_to_key() {
    assert_eq!(translate("missing.key", Vec::new()), "missing.key");
}

/// Confirms the macro stringifies argument names and values.
#[test]
fn t_macro_formats_arguments() {
    let message = t!("e2e.report.summary", passed = 3, failed = 1);
    assert_eq!(message, "Scenarios: 3 passed, 1 failed");
}

/// Confirms messages without placeholders are returned verbatim.
#[test]
fn t_macro_without_arguments() {
    assert_eq!(t!("output.stream.stdout"), "stdout");
}
