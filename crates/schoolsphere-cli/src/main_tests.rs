// crates/schoolsphere-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Argument Tests
// Description: Unit tests for the clap command surface.
// Purpose: Keep flag names, defaults, and conflicts stable for scripts.
// Dependencies: clap, schoolsphere-cli main types
// ============================================================================

//! ## Overview
//! Parses representative command lines with `Cli::try_parse_from` and checks
//! the resulting command tree.

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

use std::path::PathBuf;

use clap::CommandFactory;
use clap::Parser;

use super::Cli;
use super::Commands;
use super::ConfigCommand;
use super::E2eCommand;
use super::LogFormat;
use super::MigrateCommand;
use super::OutputFormat;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(std::iter::once("schoolsphere").chain(args.iter().copied())).unwrap()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn command_definition_is_consistent() {
    Cli::command().debug_assert();
}

#[test]
fn migrate_run_defaults_to_apply_mode() {
    let cli = parse(&["migrate", "run"]);
    let Some(Commands::Migrate {
        command: MigrateCommand::Run(run),
    }) = cli.command
    else {
        panic!("expected migrate run");
    };
    assert!(!run.dry_run);
    assert!(!run.strict);
    assert_eq!(run.format, OutputFormat::Text);
}

#[test]
fn migrate_run_accepts_dry_run_strict_and_json() {
    let cli = parse(&["migrate", "run", "--dry-run", "--strict", "--format", "json"]);
    let Some(Commands::Migrate {
        command: MigrateCommand::Run(run),
    }) = cli.command
    else {
        panic!("expected migrate run");
    };
    assert!(run.dry_run);
    assert!(run.strict);
    assert_eq!(run.format, OutputFormat::Json);
}

#[test]
fn global_flags_apply_after_subcommands() {
    let cli = parse(&["migrate", "plan", "--config", "ops/schoolsphere.toml", "--log-format", "json"]);
    assert_eq!(cli.config, Some(PathBuf::from("ops/schoolsphere.toml")));
    assert_eq!(cli.log_format, LogFormat::Json);
}

#[test]
fn backup_defaults_output_directory() {
    let cli = parse(&["backup"]);
    let Some(Commands::Backup(backup)) = cli.command else {
        panic!("expected backup");
    };
    assert_eq!(backup.out, PathBuf::from("backups"));
}

#[test]
fn e2e_run_collects_names_and_overrides() {
    let cli = parse(&[
        "e2e",
        "run",
        "login",
        "resources",
        "--file",
        "extra.json",
        "--base-url",
        "http://localhost:4173",
        "--webdriver-url",
        "http://localhost:4444",
    ]);
    let Some(Commands::E2e {
        command: E2eCommand::Run(run),
    }) = cli.command
    else {
        panic!("expected e2e run");
    };
    assert_eq!(run.names, vec!["login".to_string(), "resources".to_string()]);
    assert_eq!(run.files, vec![PathBuf::from("extra.json")]);
    assert_eq!(run.base_url.as_deref(), Some("http://localhost:4173"));
    assert_eq!(run.webdriver_url.as_deref(), Some("http://localhost:4444"));
    assert!(!run.all);
}

#[test]
fn e2e_run_rejects_names_with_all() {
    let result = Cli::try_parse_from(["schoolsphere", "e2e", "run", "login", "--all"]);
    assert!(result.is_err());
}

#[test]
fn config_subcommands_parse() {
    let cli = parse(&["config", "example"]);
    assert!(matches!(
        cli.command,
        Some(Commands::Config {
            command: ConfigCommand::Example
        })
    ));
    let cli = parse(&["e2e", "smoke"]);
    assert!(matches!(
        cli.command,
        Some(Commands::E2e {
            command: E2eCommand::Smoke(_)
        })
    ));
}

#[test]
fn version_flag_needs_no_subcommand() {
    let cli = parse(&["--version"]);
    assert!(cli.show_version);
    assert!(cli.command.is_none());
}
