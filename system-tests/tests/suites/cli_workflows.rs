// system-tests/tests/suites/cli_workflows.rs
// ============================================================================
// Module: CLI Workflow Tests
// Description: End-to-end schoolsphere CLI command coverage.
// Purpose: Validate migrate, backup, e2e, and config flows on loopback.
// Dependencies: system-tests helpers
// ============================================================================

//! CLI workflow coverage for SchoolSphere system-tests.

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

use std::fs;
use std::net::TcpListener;
use std::path::Path;
use std::path::PathBuf;

use helpers::artifacts::RunDir;
use helpers::cli::cli_binary;
use helpers::cli::run_cli;
use helpers::cli::stderr_text;
use helpers::cli::stdout_text;
use helpers::fake_appwrite::FakeAppwrite;
use helpers::fake_appwrite::collection;
use serde_json::Value;
use serde_json::json;

use crate::helpers;

type SuiteResult = Result<(), Box<dyn std::error::Error>>;

/// Config with fast polling and no page delay.
const FAST_CONFIG: &str = r"
[migration]
page_size = 2
page_delay_ms = 0
schema_wait_timeout_ms = 2000
schema_poll_interval_ms = 50
";

fn binary_or_skip(test: &str) -> Option<PathBuf> {
    let binary = cli_binary();
    if binary.is_none() {
        eprintln!("{test}: schoolsphere binary unavailable; skipping");
    }
    binary
}

fn closed_port_url() -> Result<String, String> {
    let listener = TcpListener::bind("127.0.0.1:0").map_err(|err| err.to_string())?;
    let addr = listener.local_addr().map_err(|err| err.to_string())?;
    drop(listener);
    Ok(format!("http://{addr}"))
}

fn write_config(dir: &Path) -> Result<PathBuf, String> {
    let path = dir.join("schoolsphere.toml");
    fs::write(&path, FAST_CONFIG).map_err(|err| err.to_string())?;
    Ok(path)
}

/// Seeds a pre-migration database: no phase-1 attributes yet.
fn legacy_school() -> Result<FakeAppwrite, String> {
    FakeAppwrite::start(vec![
        (
            "exams",
            collection("Exams", &["title"], vec![
                json!({"$id": "e1", "title": "Algebra"}),
                json!({"$id": "e2", "title": "Biology"}),
                json!({"$id": "e3", "title": "Chemistry"}),
            ]),
        ),
        (
            "examAttempts",
            collection("Exam Attempts", &["examId"], vec![
                json!({"$id": "a1", "examId": "e1"}),
                json!({"$id": "a2", "examId": "e2"}),
            ]),
        ),
        ("students", collection("Students", &["name"], vec![json!({"$id": "s1", "name": "John Doe"})])),
    ])
}

fn env_pairs(fake: &FakeAppwrite) -> Vec<(&'static str, String)> {
    fake.env()
}

fn run_with_fake(
    binary: &Path,
    dir: &Path,
    fake: &FakeAppwrite,
    args: &[&str],
) -> Result<std::process::Output, String> {
    let pairs = env_pairs(fake);
    let env: Vec<(&str, &str)> = pairs.iter().map(|(name, value)| (*name, value.as_str())).collect();
    run_cli(binary, dir, args, &env)
}

fn total_updated(report: &Value) -> u64 {
    report["backfills"]
        .as_array()
        .map(|backfills| backfills.iter().filter_map(|backfill| backfill["updated"].as_u64()).sum())
        .unwrap_or_default()
}

fn outcomes(report: &Value) -> Vec<String> {
    report["provisioning"]
        .as_array()
        .map(|records| {
            records.iter().filter_map(|record| record["outcome"].as_str().map(str::to_string)).collect()
        })
        .unwrap_or_default()
}

// ============================================================================
// SECTION: Offline Commands
// ============================================================================

#[test]
fn version_and_plan_need_no_connection() -> SuiteResult {
    let Some(cli) = binary_or_skip("version_and_plan_need_no_connection") else {
        return Ok(());
    };
    let dir = RunDir::new("version_and_plan")?;

    let version = run_cli(&cli, dir.path(), &["--version"], &[])?;
    assert!(version.status.success());
    assert!(stdout_text(&version).starts_with("schoolsphere "));

    let plan = run_cli(&cli, dir.path(), &["migrate", "plan", "--format", "json"], &[])?;
    assert!(plan.status.success(), "{}", stderr_text(&plan));
    let plan: Value = serde_json::from_str(&stdout_text(&plan))?;
    assert_eq!(plan["name"], "phase1");
    assert_eq!(plan["collections"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[test]
fn config_example_validates() -> SuiteResult {
    let Some(cli) = binary_or_skip("config_example_validates") else {
        return Ok(());
    };
    let dir = RunDir::new("config_example")?;

    let example = run_cli(&cli, dir.path(), &["config", "example"], &[])?;
    assert!(example.status.success());
    let path = dir.path().join("example.toml");
    fs::write(&path, example.stdout)?;

    let config_arg = path.display().to_string();
    let validate = run_cli(&cli, dir.path(), &["config", "validate", "--config", &config_arg], &[])?;
    assert!(validate.status.success(), "{}", stderr_text(&validate));
    let stdout = stdout_text(&validate);
    assert!(stdout.contains("Config valid"), "{stdout}");
    assert!(stdout.contains("connection settings incomplete"), "{stdout}");

    fs::write(&path, "[migration]\npage_size = 0\n")?;
    let invalid = run_cli(&cli, dir.path(), &["config", "validate", "--config", &config_arg], &[])?;
    assert!(!invalid.status.success());
    assert!(stderr_text(&invalid).contains("Failed to load config"));
    Ok(())
}

#[test]
fn migrate_without_connection_fails_cleanly() -> SuiteResult {
    let Some(cli) = binary_or_skip("migrate_without_connection_fails_cleanly") else {
        return Ok(());
    };
    let dir = RunDir::new("migrate_no_connection")?;

    let output = run_cli(&cli, dir.path(), &["migrate", "run", "--dry-run"], &[])?;

    assert!(!output.status.success());
    assert!(stderr_text(&output).contains("Cannot connect to Appwrite"), "{}", stderr_text(&output));
    Ok(())
}

// ============================================================================
// SECTION: Migration Against Fake Appwrite
// ============================================================================

#[test]
fn migration_dry_run_then_apply_is_idempotent() -> SuiteResult {
    let Some(cli) = binary_or_skip("migration_dry_run_then_apply_is_idempotent") else {
        return Ok(());
    };
    let dir = RunDir::new("migration_idempotent")?;
    let config = write_config(dir.path())?.display().to_string();
    let fake = legacy_school()?;
    let args = ["migrate", "run", "--config", &config, "--format", "json"];

    let mut dry_args = args.to_vec();
    dry_args.push("--dry-run");
    let dry = run_with_fake(&cli, dir.path(), &fake, &dry_args)?;
    assert!(dry.status.success(), "{}", stderr_text(&dry));
    let dry: Value = serde_json::from_str(&stdout_text(&dry))?;
    assert_eq!(outcomes(&dry), vec!["planned"; 4]);
    assert_eq!(total_updated(&dry), 0);
    assert_eq!(fake.writes(), 0);
    assert_eq!(fake.collection("exams").map(|exams| exams.attributes), Some(vec!["title".to_string()]));

    let first = run_with_fake(&cli, dir.path(), &fake, &args)?;
    assert!(first.status.success(), "{}", stderr_text(&first));
    let first: Value = serde_json::from_str(&stdout_text(&first))?;
    assert_eq!(outcomes(&first), vec!["created"; 4]);
    assert_eq!(total_updated(&first), 5);
    let exams = fake.collection("exams").ok_or("exams missing")?;
    for document in &exams.documents {
        assert_eq!(document.get("mode"), Some(&json!("exam")));
        assert_eq!(document.get("assignedTo"), Some(&json!([])));
    }
    let attempts = fake.collection("examAttempts").ok_or("attempts missing")?;
    assert!(attempts.documents.iter().all(|document| document.get("timePerQuestion") == Some(&json!(0))));

    let second = run_with_fake(&cli, dir.path(), &fake, &args)?;
    assert!(second.status.success(), "{}", stderr_text(&second));
    let second: Value = serde_json::from_str(&stdout_text(&second))?;
    assert_eq!(outcomes(&second), vec!["skipped"; 4]);
    assert_eq!(total_updated(&second), 0);
    assert_eq!(fake.writes(), 5);
    Ok(())
}

#[test]
fn strict_mode_turns_document_failures_into_exit_status() -> SuiteResult {
    let Some(cli) = binary_or_skip("strict_mode_turns_document_failures_into_exit_status") else {
        return Ok(());
    };
    let dir = RunDir::new("migration_strict")?;
    let config = write_config(dir.path())?.display().to_string();
    let fake = legacy_school()?;
    fake.reject_updates("e2");

    let lenient = run_with_fake(&cli, dir.path(), &fake, &["migrate", "run", "--config", &config])?;
    assert!(lenient.status.success(), "{}", stderr_text(&lenient));
    let stdout = stdout_text(&lenient);
    assert!(stdout.contains("exams: scanned 3, pending 3, updated 2, failed 1"), "{stdout}");
    assert!(stdout.contains("e2: "), "{stdout}");
    assert!(stderr_text(&lenient).contains("finished with failures"));

    let strict = run_with_fake(&cli, dir.path(), &fake, &["migrate", "run", "--strict", "--config", &config])?;
    assert!(!strict.status.success());
    let stdout = stdout_text(&strict);
    assert!(stdout.contains("exams: scanned 3, pending 1, updated 0, failed 1"), "{stdout}");
    Ok(())
}

#[test]
fn backup_exports_every_collection() -> SuiteResult {
    let Some(cli) = binary_or_skip("backup_exports_every_collection") else {
        return Ok(());
    };
    let dir = RunDir::new("backup")?;
    let config = write_config(dir.path())?.display().to_string();
    let fake = legacy_school()?;
    let out = dir.path().join("backups");
    let out_arg = out.display().to_string();

    let output = run_with_fake(&cli, dir.path(), &fake, &["backup", "--config", &config, "--out", &out_arg])?;
    assert!(output.status.success(), "{}", stderr_text(&output));

    let runs: Vec<PathBuf> = fs::read_dir(&out)?.filter_map(Result::ok).map(|entry| entry.path()).collect();
    assert_eq!(runs.len(), 1);
    let metadata: Value = serde_json::from_slice(&fs::read(runs[0].join("metadata.json"))?)?;
    assert_eq!(metadata["databaseId"], "schoolsphere");
    assert_eq!(metadata["endpoint"], fake.endpoint());
    let counts: Vec<(String, u64)> = metadata["collections"]
        .as_array()
        .ok_or("collections missing")?
        .iter()
        .map(|entry| (entry["id"].as_str().unwrap_or_default().to_string(), entry["count"].as_u64().unwrap_or(0)))
        .collect();
    assert_eq!(counts, vec![
        ("examAttempts".to_string(), 2),
        ("exams".to_string(), 3),
        ("students".to_string(), 1),
    ]);
    let exams: Value = serde_json::from_slice(&fs::read(runs[0].join("database").join("exams.json"))?)?;
    assert_eq!(exams["documents"].as_array().map(Vec::len), Some(3));
    assert_eq!(fake.writes(), 0);
    Ok(())
}

// ============================================================================
// SECTION: UI Commands
// ============================================================================

#[test]
fn e2e_list_and_selection_errors() -> SuiteResult {
    let Some(cli) = binary_or_skip("e2e_list_and_selection_errors") else {
        return Ok(());
    };
    let dir = RunDir::new("e2e_list")?;

    let list = run_cli(&cli, dir.path(), &["e2e", "list"], &[])?;
    assert!(list.status.success());
    assert_eq!(stdout_text(&list).lines().count(), 13);

    let unknown = run_cli(&cli, dir.path(), &["e2e", "run", "grading"], &[])?;
    assert!(!unknown.status.success());
    assert!(stderr_text(&unknown).contains("unknown scenario: grading"));
    Ok(())
}

#[test]
fn e2e_smoke_skips_when_app_is_down() -> SuiteResult {
    let Some(cli) = binary_or_skip("e2e_smoke_skips_when_app_is_down") else {
        return Ok(());
    };
    let dir = RunDir::new("e2e_smoke")?;
    let base_url = closed_port_url()?;

    let output = run_cli(&cli, dir.path(), &["e2e", "smoke", "--base-url", &base_url], &[])?;

    assert!(output.status.success(), "{}", stderr_text(&output));
    assert!(stdout_text(&output).contains("skipping health check"));
    Ok(())
}

#[test]
fn e2e_run_reports_unreachable_webdriver() -> SuiteResult {
    let Some(cli) = binary_or_skip("e2e_run_reports_unreachable_webdriver") else {
        return Ok(());
    };
    let dir = RunDir::new("e2e_no_driver")?;
    let driver_url = closed_port_url()?;

    let output = run_cli(
        &cli,
        dir.path(),
        &["e2e", "run", "login", "student-dashboard", "--webdriver-url", &driver_url],
        &[],
    )?;

    assert!(!output.status.success());
    let stdout = stdout_text(&output);
    assert!(stdout.contains("FAIL login at step 0"), "{stdout}");
    assert!(stdout.contains("FAIL student-dashboard at step 0"), "{stdout}");
    assert!(stdout.contains("Scenarios: 0 passed, 2 failed"), "{stdout}");
    Ok(())
}
