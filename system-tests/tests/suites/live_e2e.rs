// system-tests/tests/suites/live_e2e.rs
// ============================================================================
// Module: Live UI Tests
// Description: Catalog scenarios against a running app and WebDriver server.
// Purpose: Exercise real browser sessions end to end.
// Dependencies: system-tests config, schoolsphere-e2e
// ============================================================================

//! Live UI scenario coverage.
//!
//! Runs only when `SCHOOLSPHERE_SYSTEM_TEST_BASE_URL` and
//! `SCHOOLSPHERE_SYSTEM_TEST_WEBDRIVER_URL` are set. The API health check
//! runs when `SCHOOLSPHERE_SYSTEM_TEST_API_URL` is also set.

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

use helpers::artifacts::RunDir;
use schoolsphere_e2e::RunnerConfig;
use schoolsphere_e2e::ScenarioRunner;
use schoolsphere_e2e::SmokeOutcome;
use schoolsphere_e2e::WebDriverConfig;
use schoolsphere_e2e::WebDriverSession;
use schoolsphere_e2e::find_builtin;
use schoolsphere_e2e::probe_health;
use schoolsphere_e2e::run_scenarios;
use system_tests::config::SystemTestConfig;

use crate::helpers;

type SuiteResult = Result<(), Box<dyn std::error::Error>>;

#[test]
fn live_login_and_dashboards() -> SuiteResult {
    let config = SystemTestConfig::load()?;
    let Some((base_url, webdriver_url)) = config.ui_targets() else {
        eprintln!("live_e2e: UI targets not configured; skipping");
        return Ok(());
    };
    if let Some(api_url) = config.api_url.as_deref()
        && let SmokeOutcome::Failed(reason) = probe_health(api_url, Duration::from_secs(5))
    {
        return Err(format!("api server unhealthy: {reason}").into());
    }
    let dir = RunDir::new("live_e2e")?;

    let mut runner_config = RunnerConfig::new(base_url);
    runner_config.artifacts_dir = dir.path().join("artifacts");
    if let Some(timeout) = config.timeout {
        runner_config.default_timeout = timeout;
    }
    let runner = ScenarioRunner::new(runner_config);
    let driver = WebDriverConfig::new(webdriver_url);
    let scenarios: Vec<_> = ["login", "student-dashboard", "student-payment-view"]
        .into_iter()
        .filter_map(find_builtin)
        .collect();
    assert_eq!(scenarios.len(), 3);

    let reports = run_scenarios(&runner, &scenarios, || WebDriverSession::start(&driver));

    for report in &reports {
        assert!(report.passed(), "{report:?}");
    }
    let login = &reports[0];
    assert!(login.screenshots.iter().all(|path| path.exists()));
    Ok(())
}
