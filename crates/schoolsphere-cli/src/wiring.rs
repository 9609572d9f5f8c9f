// crates/schoolsphere-cli/src/wiring.rs
// ============================================================================
// Module: CLI Wiring
// Description: Maps loaded configuration onto runtime component settings.
// Purpose: Keep configuration-to-runtime translation out of the binary.
// Dependencies: schoolsphere-config, schoolsphere-core, schoolsphere-appwrite,
//               schoolsphere-e2e
// ============================================================================

//! ## Overview
//! The runtime crates do not depend on the config crate. This module is the
//! single place where `schoolsphere.toml` values, environment connection
//! settings, and command-line overrides are merged into the settings each
//! runtime component takes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use schoolsphere_appwrite::AppwriteClientConfig;
use schoolsphere_config::AccountConfig;
use schoolsphere_config::AccountsConfig;
use schoolsphere_config::AppwriteConfig;
use schoolsphere_config::AppwriteConnection;
use schoolsphere_config::BrowserKind;
use schoolsphere_config::E2eConfig;
use schoolsphere_config::MigrationConfig;
use schoolsphere_core::BackupOptions;
use schoolsphere_core::MigrationReport;
use schoolsphere_e2e::Account;
use schoolsphere_e2e::Accounts;
use schoolsphere_e2e::Browser;
use schoolsphere_e2e::RunnerConfig;
use schoolsphere_e2e::Scenario;
use schoolsphere_e2e::ScenarioFileError;
use schoolsphere_e2e::WebDriverConfig;
use schoolsphere_e2e::builtin_scenarios;
use schoolsphere_e2e::load_scenarios;
use thiserror::Error;

// ============================================================================
// SECTION: Appwrite
// ============================================================================

/// Builds the REST client settings from the connection and `[appwrite]`.
#[must_use]
pub fn appwrite_client_config(connection: &AppwriteConnection, appwrite: &AppwriteConfig) -> AppwriteClientConfig {
    let mut config = AppwriteClientConfig::new(
        &connection.endpoint,
        &connection.project_id,
        &connection.api_key,
        connection.database_id.clone(),
    );
    config.timeout = appwrite.request_timeout();
    config.user_agent.clone_from(&appwrite.user_agent);
    config
}

/// Builds backup options sharing the migration's pagination settings.
#[must_use]
pub fn backup_options(out_dir: &Path, connection: &AppwriteConnection, migration: &MigrationConfig) -> BackupOptions {
    let mut options = BackupOptions::new(out_dir, &connection.endpoint, &connection.project_id);
    let runtime = migration.options(false);
    options.page_size = runtime.page_size;
    options.page_delay = runtime.page_delay;
    options
}

/// Returns true when a migration run should exit successfully.
///
/// Without `strict`, per-attribute and per-document failures are reported
/// but do not fail the process.
#[must_use]
pub fn migration_succeeded(report: &MigrationReport, strict: bool) -> bool {
    !strict || !report.has_failures()
}

// ============================================================================
// SECTION: UI Scenarios
// ============================================================================

/// Maps the configured browser onto the WebDriver browser.
#[must_use]
pub const fn browser(kind: BrowserKind) -> Browser {
    match kind {
        BrowserKind::Chrome => Browser::Chrome,
        BrowserKind::Firefox => Browser::Firefox,
    }
}

fn account(config: &AccountConfig) -> Account {
    Account::new(config.email.clone(), config.password.clone())
}

/// Maps configured credentials onto runner accounts.
#[must_use]
pub fn accounts(config: &AccountsConfig) -> Accounts {
    Accounts {
        admin: account(&config.admin),
        teacher: account(&config.teacher),
        student: account(&config.student),
    }
}

/// Builds WebDriver settings, with an optional URL override.
#[must_use]
pub fn webdriver_config(e2e: &E2eConfig, webdriver_url: Option<&str>) -> WebDriverConfig {
    let mut config = WebDriverConfig::new(webdriver_url.unwrap_or(&e2e.webdriver_url));
    config.browser = browser(e2e.browser);
    config.headless = e2e.headless;
    config
}

/// Builds runner settings, with an optional base URL override.
#[must_use]
pub fn runner_config(e2e: &E2eConfig, base_url: Option<&str>) -> RunnerConfig {
    let mut config = RunnerConfig::new(base_url.unwrap_or(&e2e.base_url));
    config.default_timeout = e2e.default_timeout();
    config.poll_interval = e2e.poll_interval();
    config.artifacts_dir = e2e.screenshot_dir.clone();
    config.accounts = accounts(&e2e.accounts);
    config
}

/// Environment variable naming the API server for `e2e smoke`.
pub const SMOKE_BASE_URL_ENV: &str = "BASE_URL";

/// Resolves the server `e2e smoke` probes.
///
/// The flag wins, then a non-empty `BASE_URL` from `lookup`, then
/// `e2e.api_url`. The web application URL is never used: the dev server
/// answers `/health` with the single-page app shell.
#[must_use]
pub fn smoke_target(e2e: &E2eConfig, base_url: Option<&str>, lookup: impl Fn(&str) -> Option<String>) -> String {
    if let Some(url) = base_url {
        return url.to_string();
    }
    lookup(SMOKE_BASE_URL_ENV)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| e2e.api_url.clone())
}

/// Scenario selection errors.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// A requested name matched no scenario.
    #[error("unknown scenario: {0}")]
    UnknownScenario(String),
    /// Neither names nor `--all` were given.
    #[error("no scenarios selected; pass scenario names or --all")]
    NothingSelected,
    /// A scenario file could not be loaded.
    #[error(transparent)]
    File(#[from] ScenarioFileError),
    /// Two scenarios share a name.
    #[error("duplicate scenario name: {0}")]
    Duplicate(String),
}

/// Returns the built-in catalog followed by scenarios from `files`.
///
/// # Errors
///
/// Returns [`SelectionError::File`] when a file fails to load and
/// [`SelectionError::Duplicate`] when a name appears twice.
pub fn available_scenarios(files: &[PathBuf]) -> Result<Vec<Scenario>, SelectionError> {
    let mut scenarios = builtin_scenarios();
    for file in files {
        scenarios.extend(load_scenarios(file)?);
    }
    let mut seen = HashSet::new();
    for scenario in &scenarios {
        if !seen.insert(scenario.name.as_str()) {
            return Err(SelectionError::Duplicate(scenario.name.clone()));
        }
    }
    Ok(scenarios)
}

/// Picks scenarios by name, or every available scenario with `all`.
///
/// Named scenarios run in the order given.
///
/// # Errors
///
/// Returns [`SelectionError`] for unknown names, empty selections, or
/// unloadable files.
pub fn select_scenarios(names: &[String], all: bool, files: &[PathBuf]) -> Result<Vec<Scenario>, SelectionError> {
    let available = available_scenarios(files)?;
    if all {
        return Ok(available);
    }
    if names.is_empty() {
        return Err(SelectionError::NothingSelected);
    }
    names
        .iter()
        .map(|name| {
            available
                .iter()
                .find(|scenario| &scenario.name == name)
                .cloned()
                .ok_or_else(|| SelectionError::UnknownScenario(name.clone()))
        })
        .collect()
}
