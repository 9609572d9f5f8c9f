// crates/schoolsphere-e2e/src/runner.rs
// ============================================================================
// Module: Scenario Runner
// Description: Executes scenarios step by step against a browser page.
// Purpose: Fail-fast scenario execution with bounded polling and artifacts.
// Dependencies: crate::{browser, catalog, locator, scenario}, serde, time, tracing, url
// ============================================================================

//! ## Overview
//! [`ScenarioRunner`] signs in (when the scenario names a role), renders
//! `{stamp}` templates, and executes steps in order. Every element step
//! polls until its condition holds or the step timeout elapses; the first
//! failure ends the scenario, and a `failure.png` screenshot is attempted
//! before returning.
//!
//! Security posture: credentials are typed into the page but never logged
//! or written to reports; step descriptions omit fill values.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use std::time::Instant;

use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;
use tracing::info;
use tracing::warn;
use url::Url;

use crate::browser::BrowserError;
use crate::browser::BrowserPage;
use crate::browser::ElementHandle;
use crate::catalog::login_steps;
use crate::locator::Locator;
use crate::scenario::Accounts;
use crate::scenario::Action;
use crate::scenario::Scenario;
use crate::scenario::Step;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Runner settings shared by all scenarios of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Application base URL, e.g. `http://localhost:5173`.
    pub base_url: String,
    /// Wait applied to steps without their own timeout.
    pub default_timeout: Duration,
    /// Delay between condition checks.
    pub poll_interval: Duration,
    /// Directory receiving per-scenario screenshots and upload files.
    pub artifacts_dir: PathBuf,
    /// Accounts used for sign-in.
    pub accounts: Accounts,
}

impl RunnerConfig {
    /// Creates a configuration with default waits and seeded accounts.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            default_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(100),
            artifacts_dir: PathBuf::from("e2e-artifacts"),
            accounts: Accounts::default(),
        }
    }
}

// ============================================================================
// SECTION: Errors and Reports
// ============================================================================

/// Reasons a scenario step fails.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The condition did not hold before the timeout.
    #[error("timed out after {timeout_ms} ms waiting for {condition}{}", last_error_suffix(.last_error.as_deref()))]
    Timeout {
        /// Description of the awaited condition.
        condition: String,
        /// Timeout that elapsed.
        timeout_ms: u64,
        /// Last transient driver error seen while polling.
        last_error: Option<String>,
    },
    /// The browser driver failed.
    #[error(transparent)]
    Browser(#[from] BrowserError),
    /// A screenshot or upload file could not be written.
    #[error("artifact io error at {path}: {message}")]
    Artifact {
        /// Artifact path.
        path: PathBuf,
        /// Error message.
        message: String,
    },
    /// A navigation target did not form a valid URL.
    #[error("invalid url: {0}")]
    Url(String),
}

fn last_error_suffix(last_error: Option<&str>) -> String {
    last_error.map(|err| format!(" (last error: {err})")).unwrap_or_default()
}

/// Scenario outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    /// Every step succeeded.
    Passed,
    /// A step failed and the remaining steps were skipped.
    Failed,
}

/// The step that ended a failed scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepFailure {
    /// One-based step number, counting sign-in steps.
    pub index: usize,
    /// Step description.
    pub step: String,
    /// Failure message.
    pub message: String,
}

/// Result of one scenario run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    /// Scenario name.
    pub name: String,
    /// Stamp substituted for `{stamp}`.
    pub stamp: i64,
    /// Outcome.
    pub status: ScenarioStatus,
    /// Steps including sign-in.
    pub steps_total: usize,
    /// Steps that completed.
    pub steps_passed: usize,
    /// Failing step, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<StepFailure>,
    /// Screenshots written, in order.
    pub screenshots: Vec<PathBuf>,
    /// Wall-clock duration in milliseconds.
    pub elapsed_ms: u64,
}

impl ScenarioReport {
    /// Returns true when the scenario passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == ScenarioStatus::Passed
    }

    /// Report for a scenario whose browser session never started.
    #[must_use]
    pub fn session_failed(scenario: &Scenario, error: &BrowserError) -> Self {
        Self {
            name: scenario.name.clone(),
            stamp: 0,
            status: ScenarioStatus::Failed,
            steps_total: scenario.steps.len(),
            steps_passed: 0,
            failure: Some(StepFailure {
                index: 0,
                step: "start browser session".to_string(),
                message: error.to_string(),
            }),
            screenshots: Vec::new(),
            elapsed_ms: 0,
        }
    }
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Executes scenarios against a [`BrowserPage`].
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    /// Runner configuration.
    config: RunnerConfig,
}

impl ScenarioRunner {
    /// Creates a runner.
    #[must_use]
    pub const fn new(config: RunnerConfig) -> Self {
        Self {
            config,
        }
    }

    /// Returns the runner configuration.
    #[must_use]
    pub const fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Runs a scenario stamped with the current unix time.
    pub fn run<P: BrowserPage>(&self, page: &mut P, scenario: &Scenario) -> ScenarioReport {
        self.run_with_stamp(page, scenario, OffsetDateTime::now_utc().unix_timestamp())
    }

    /// Runs a scenario with an explicit stamp.
    pub fn run_with_stamp<P: BrowserPage>(
        &self,
        page: &mut P,
        scenario: &Scenario,
        stamp: i64,
    ) -> ScenarioReport {
        let started = Instant::now();
        let steps = self.expand(scenario, stamp);
        let artifact_dir = self.config.artifacts_dir.join(&scenario.name);
        let mut report = ScenarioReport {
            name: scenario.name.clone(),
            stamp,
            status: ScenarioStatus::Passed,
            steps_total: steps.len(),
            steps_passed: 0,
            failure: None,
            screenshots: Vec::new(),
            elapsed_ms: 0,
        };
        info!(scenario = %scenario.name, stamp, steps = steps.len(), "scenario started");

        for (index, step) in steps.iter().enumerate() {
            debug!(scenario = %scenario.name, step = index + 1, action = %step, "running step");
            match self.execute(page, step, &artifact_dir) {
                Ok(screenshot) => {
                    report.steps_passed += 1;
                    report.screenshots.extend(screenshot);
                }
                Err(err) => {
                    warn!(
                        scenario = %scenario.name,
                        step = index + 1,
                        action = %step,
                        error = %err,
                        "scenario step failed"
                    );
                    report.status = ScenarioStatus::Failed;
                    report.failure = Some(StepFailure {
                        index: index + 1,
                        step: step.to_string(),
                        message: err.to_string(),
                    });
                    match capture(page, &artifact_dir, "failure") {
                        Ok(path) => report.screenshots.push(path),
                        Err(shot_err) => {
                            warn!(scenario = %scenario.name, error = %shot_err, "failure screenshot not captured");
                        }
                    }
                    break;
                }
            }
        }

        report.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            scenario = %scenario.name,
            passed = report.passed(),
            steps_passed = report.steps_passed,
            elapsed_ms = report.elapsed_ms,
            "scenario finished"
        );
        report
    }

    /// Returns sign-in steps followed by the rendered scenario steps.
    fn expand(&self, scenario: &Scenario, stamp: i64) -> Vec<Step> {
        let mut steps = scenario
            .login
            .map(|role| login_steps(self.config.accounts.get(role)))
            .unwrap_or_default();
        steps.extend(scenario.steps.iter().map(|step| step.render(stamp)));
        steps
    }

    /// Executes one step, returning the screenshot path it wrote.
    fn execute<P: BrowserPage>(
        &self,
        page: &mut P,
        step: &Step,
        artifact_dir: &Path,
    ) -> Result<Option<PathBuf>, ScenarioError> {
        let wait = Wait {
            timeout: step.timeout_ms.map_or(self.config.default_timeout, Duration::from_millis),
            poll: self.config.poll_interval,
            condition: step.to_string(),
        };
        match &step.action {
            Action::Goto {
                path,
            } => {
                page.goto(self.resolve_url(path)?.as_str())?;
            }
            Action::Fill {
                locator,
                value,
            } => wait.until(page, |page| {
                let Some(element) = first_visible(page, locator)? else {
                    return Ok(None);
                };
                page.clear(&element)?;
                page.send_keys(&element, value)?;
                Ok(Some(()))
            })?,
            Action::Click {
                locator,
            } => wait.until(page, |page| {
                let Some(element) = first_visible(page, locator)? else {
                    return Ok(None);
                };
                page.click(&element)?;
                Ok(Some(()))
            })?,
            Action::ExpectVisible {
                locator,
            } => wait.until(page, |page| Ok(first_visible(page, locator)?.map(|_| ())))?,
            Action::ExpectHidden {
                locator,
            } => wait.until(page, |page| {
                Ok(if first_visible(page, locator)?.is_some() { None } else { Some(()) })
            })?,
            Action::ExpectDisabled {
                locator,
            } => wait.until(page, |page| {
                let Some(element) = first_visible(page, locator)? else {
                    return Ok(None);
                };
                Ok(if page.is_enabled(&element)? { None } else { Some(()) })
            })?,
            Action::ExpectUrlContains {
                fragment,
            } => wait.until(page, |page| {
                Ok(page.current_url()?.contains(fragment.as_str()).then_some(()))
            })?,
            Action::Pause {
                ms,
            } => thread::sleep(Duration::from_millis(*ms)),
            Action::Screenshot {
                name,
            } => return capture(page, artifact_dir, name).map(Some),
            Action::UploadFile {
                locator,
                file_name,
                contents,
            } => {
                let path = write_upload(artifact_dir, file_name, contents)?;
                let path_text = path.to_string_lossy().into_owned();
                wait.until(page, |page| {
                    let Some(element) = resolve(page, locator, None)?.into_iter().next() else {
                        return Ok(None);
                    };
                    page.send_keys(&element, &path_text)?;
                    Ok(Some(()))
                })?;
            }
        }
        Ok(None)
    }

    /// Resolves a step path against the base URL.
    fn resolve_url(&self, path: &str) -> Result<Url, ScenarioError> {
        let base = Url::parse(&self.config.base_url)
            .map_err(|err| ScenarioError::Url(format!("{}: {err}", self.config.base_url)))?;
        base.join(path).map_err(|err| ScenarioError::Url(format!("{path}: {err}")))
    }
}

/// Runs scenarios one after another, each in a fresh page from `open_page`.
///
/// A page that fails to open fails only its scenario. Pages are dropped
/// (closing their sessions) before the next scenario starts.
pub fn run_scenarios<P, F>(
    runner: &ScenarioRunner,
    scenarios: &[Scenario],
    mut open_page: F,
) -> Vec<ScenarioReport>
where
    P: BrowserPage,
    F: FnMut() -> Result<P, BrowserError>,
{
    scenarios
        .iter()
        .map(|scenario| match open_page() {
            Ok(mut page) => runner.run(&mut page, scenario),
            Err(err) => {
                warn!(scenario = %scenario.name, error = %err, "browser session failed to start");
                ScenarioReport::session_failed(scenario, &err)
            }
        })
        .collect()
}

// ============================================================================
// SECTION: Polling
// ============================================================================

/// A bounded wait for one step condition.
struct Wait {
    timeout: Duration,
    poll: Duration,
    condition: String,
}

impl Wait {
    /// Polls `probe` until it yields a value or the timeout elapses.
    ///
    /// Transient driver errors count as "not yet"; other errors end the wait.
    /// The probe always runs at least once.
    fn until<P, T>(
        &self,
        page: &mut P,
        mut probe: impl FnMut(&mut P) -> Result<Option<T>, BrowserError>,
    ) -> Result<T, ScenarioError> {
        let deadline = Instant::now() + self.timeout;
        let mut last_error = None;
        loop {
            match probe(page) {
                Ok(Some(value)) => return Ok(value),
                Ok(None) => {}
                Err(err) if err.is_transient() => last_error = Some(err.to_string()),
                Err(err) => return Err(err.into()),
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(ScenarioError::Timeout {
                    condition: self.condition.clone(),
                    timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                    last_error,
                });
            }
            thread::sleep(self.poll.min(deadline - now));
        }
    }
}

// ============================================================================
// SECTION: Element Resolution
// ============================================================================

/// Resolves a locator to its current matches, searching inside `scope`.
fn resolve<P: BrowserPage>(
    page: &mut P,
    locator: &Locator,
    scope: Option<&ElementHandle>,
) -> Result<Vec<ElementHandle>, BrowserError> {
    if let Locator::Within {
        scope: outer,
        has_text,
        target,
    } = locator
    {
        let mut chosen = None;
        for candidate in resolve(page, outer, scope)? {
            let contains_text = match has_text {
                Some(text) => page.text(&candidate)?.contains(text.as_str()),
                None => true,
            };
            if contains_text {
                chosen = Some(candidate);
                break;
            }
        }
        return match chosen {
            Some(element) => resolve(page, target, Some(&element)),
            None => Ok(Vec::new()),
        };
    }
    match locator.selector() {
        Some(selector) => page.find_all(&selector, scope),
        None => Ok(Vec::new()),
    }
}

/// Returns the first displayed match of a locator.
fn first_visible<P: BrowserPage>(
    page: &mut P,
    locator: &Locator,
) -> Result<Option<ElementHandle>, BrowserError> {
    for element in resolve(page, locator, None)? {
        if page.is_displayed(&element)? {
            return Ok(Some(element));
        }
    }
    Ok(None)
}

// ============================================================================
// SECTION: Artifacts
// ============================================================================

/// Writes a PNG screenshot to `<dir>/<name>.png`.
fn capture<P: BrowserPage>(page: &mut P, dir: &Path, name: &str) -> Result<PathBuf, ScenarioError> {
    let png = page.screenshot()?;
    let path = dir.join(format!("{name}.png"));
    write_artifact(&path, &png)?;
    info!(path = %path.display(), "screenshot saved");
    Ok(path)
}

/// Writes an upload file and returns its absolute path.
fn write_upload(dir: &Path, file_name: &str, contents: &str) -> Result<PathBuf, ScenarioError> {
    let path = dir.join("uploads").join(file_name);
    write_artifact(&path, contents.as_bytes())?;
    std::path::absolute(&path).map_err(|err| ScenarioError::Artifact {
        path,
        message: err.to_string(),
    })
}

fn write_artifact(path: &Path, bytes: &[u8]) -> Result<(), ScenarioError> {
    let artifact_error = |err: std::io::Error| ScenarioError::Artifact {
        path: path.to_path_buf(),
        message: err.to_string(),
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(artifact_error)?;
    }
    fs::write(path, bytes).map_err(artifact_error)
}
