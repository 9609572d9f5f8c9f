// crates/schoolsphere-e2e/src/lib.rs
// ============================================================================
// Module: SchoolSphere E2E Library
// Description: Browser-driven scenarios against the SchoolSphere web UI.
// Purpose: Describe, catalog, and run linear UI scenarios over WebDriver.
// Dependencies: crate::{browser, catalog, locator, runner, scenario, smoke, webdriver}
// ============================================================================

//! ## Overview
//! A [`Scenario`] is a linear list of [`Step`]s: navigate, fill, click, and
//! expect. The [`ScenarioRunner`] drives any [`BrowserPage`] through it with
//! bounded polling and stops at the first unmet expectation. The built-in
//! [`catalog`] covers the admin, teacher, and student flows; further
//! scenarios can be loaded from JSON files.
//!
//! [`WebDriverSession`] implements [`BrowserPage`] over the W3C WebDriver
//! protocol and closes its session when dropped. [`probe_health`] is the
//! pre-flight smoke check against the application server.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod browser;
pub mod catalog;
pub mod locator;
pub mod runner;
pub mod scenario;
pub mod smoke;
pub mod webdriver;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use browser::BrowserError;
pub use browser::BrowserPage;
pub use browser::ElementHandle;
pub use catalog::builtin_scenarios;
pub use catalog::find_builtin;
pub use catalog::login_steps;
pub use locator::Locator;
pub use locator::Selector;
pub use runner::RunnerConfig;
pub use runner::ScenarioError;
pub use runner::ScenarioReport;
pub use runner::ScenarioRunner;
pub use runner::ScenarioStatus;
pub use runner::StepFailure;
pub use runner::run_scenarios;
pub use scenario::Account;
pub use scenario::Accounts;
pub use scenario::Action;
pub use scenario::Role;
pub use scenario::Scenario;
pub use scenario::ScenarioFileError;
pub use scenario::Step;
pub use scenario::load_scenarios;
pub use smoke::SmokeOutcome;
pub use smoke::probe_health;
pub use webdriver::Browser;
pub use webdriver::WebDriverConfig;
pub use webdriver::WebDriverSession;
