// system-tests/tests/suites/live_migration.rs
// ============================================================================
// Module: Live Migration Tests
// Description: Phase-1 migration against a real Appwrite project.
// Purpose: Confirm dry-run safety and idempotence against the real BaaS.
// Dependencies: system-tests config, schoolsphere-{appwrite,config,core}
// ============================================================================

//! Live migration coverage.
//!
//! Runs only when the Appwrite connection variables are set. The apply pass
//! additionally requires `SCHOOLSPHERE_SYSTEM_TEST_ALLOW_WRITES=1`.

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

use std::time::Duration;

use schoolsphere_appwrite::AppwriteClient;
use schoolsphere_appwrite::AppwriteClientConfig;
use schoolsphere_config::AppwriteConnection;
use schoolsphere_core::MigrationOptions;
use schoolsphere_core::MigrationPlan;
use schoolsphere_core::MigrationRunner;
use schoolsphere_core::ProvisionOutcome;
use schoolsphere_core::WaitPolicy;
use system_tests::config::SystemTestConfig;

type SuiteResult = Result<(), Box<dyn std::error::Error>>;

fn live_client(timeout: Option<Duration>) -> Option<AppwriteClient> {
    let Ok(connection) = AppwriteConnection::from_env() else {
        eprintln!("live_migration: Appwrite connection not configured; skipping");
        return None;
    };
    let mut config = AppwriteClientConfig::new(
        &connection.endpoint,
        &connection.project_id,
        &connection.api_key,
        connection.database_id,
    );
    if let Some(timeout) = timeout {
        config.timeout = timeout;
    }
    AppwriteClient::new(config).ok()
}

fn options(dry_run: bool) -> MigrationOptions {
    MigrationOptions {
        dry_run,
        page_size: 100,
        page_delay: Duration::from_millis(20),
        wait: WaitPolicy {
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(1),
        },
    }
}

#[test]
fn live_dry_run_writes_nothing() -> SuiteResult {
    let config = SystemTestConfig::load()?;
    let Some(client) = live_client(config.timeout) else {
        return Ok(());
    };

    let report = MigrationRunner::new(client, options(true)).run(&MigrationPlan::phase1())?;

    assert!(report.dry_run);
    assert!(report.waits.is_empty());
    assert_eq!(report.total_updated(), 0);
    assert!(
        report
            .provisioning
            .iter()
            .all(|record| matches!(record.outcome, ProvisionOutcome::Planned | ProvisionOutcome::Skipped)),
        "{report:?}"
    );
    Ok(())
}

#[test]
fn live_apply_converges() -> SuiteResult {
    let config = SystemTestConfig::load()?;
    if !config.allow_writes {
        eprintln!("live_migration: writes not allowed; skipping apply pass");
        return Ok(());
    }
    let Some(client) = live_client(config.timeout) else {
        return Ok(());
    };
    let runner = MigrationRunner::new(client, options(false));

    let first = runner.run(&MigrationPlan::phase1())?;
    assert!(!first.has_failures(), "{first:?}");

    let second = runner.run(&MigrationPlan::phase1())?;
    assert!(!second.has_failures(), "{second:?}");
    assert!(second.provisioning.iter().all(|record| record.outcome == ProvisionOutcome::Skipped));
    assert_eq!(second.total_updated(), 0);
    for backfill in &second.backfills {
        assert_eq!(backfill.pending, 0, "{} still has documents missing fields", backfill.collection);
    }
    Ok(())
}
