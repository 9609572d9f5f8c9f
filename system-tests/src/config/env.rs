// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for system tests.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Optional run root override for artifacts.
    RunRoot,
    /// Optional timeout override in seconds (positive integer).
    TimeoutSeconds,
    /// Allow live suites to write to the configured Appwrite project.
    AllowWrites,
    /// Base URL of a running web application for live UI suites.
    BaseUrl,
    /// WebDriver server URL for live UI suites.
    WebDriverUrl,
    /// API server URL whose `/health` the live UI suites check first.
    ApiUrl,
}

impl SystemTestEnv {
    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "SCHOOLSPHERE_SYSTEM_TEST_RUN_ROOT",
            Self::TimeoutSeconds => "SCHOOLSPHERE_SYSTEM_TEST_TIMEOUT_SEC",
            Self::AllowWrites => "SCHOOLSPHERE_SYSTEM_TEST_ALLOW_WRITES",
            Self::BaseUrl => "SCHOOLSPHERE_SYSTEM_TEST_BASE_URL",
            Self::WebDriverUrl => "SCHOOLSPHERE_SYSTEM_TEST_WEBDRIVER_URL",
            Self::ApiUrl => "SCHOOLSPHERE_SYSTEM_TEST_API_URL",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed system test configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Optional run root override.
    pub run_root: Option<PathBuf>,
    /// Optional timeout override in seconds (positive integer).
    pub timeout: Option<Duration>,
    /// Live suites may write to the Appwrite project (`true`/`false` or `1`/`0`).
    pub allow_writes: bool,
    /// Web application base URL for live UI suites.
    pub base_url: Option<String>,
    /// WebDriver server URL for live UI suites.
    pub webdriver_url: Option<String>,
    /// API server URL probed before live UI suites.
    pub api_url: Option<String>,
}

impl SystemTestConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value is not valid UTF-8, is empty,
    /// or fails validation (for example, an invalid timeout or boolean value).
    pub fn load() -> Result<Self, String> {
        let run_root = read_env_nonempty(SystemTestEnv::RunRoot.as_str())?.map(PathBuf::from);
        let timeout = read_env_nonempty(SystemTestEnv::TimeoutSeconds.as_str())?
            .map(|value| parse_timeout_seconds(SystemTestEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        let allow_writes = parse_bool_env(
            SystemTestEnv::AllowWrites.as_str(),
            read_env_nonempty(SystemTestEnv::AllowWrites.as_str())?,
        )?;
        let base_url = read_env_nonempty(SystemTestEnv::BaseUrl.as_str())?;
        let webdriver_url = read_env_nonempty(SystemTestEnv::WebDriverUrl.as_str())?;
        let api_url = read_env_nonempty(SystemTestEnv::ApiUrl.as_str())?;
        Ok(Self {
            run_root,
            timeout,
            allow_writes,
            base_url,
            webdriver_url,
            api_url,
        })
    }

    /// Returns the UI targets when both are configured.
    #[must_use]
    pub fn ui_targets(&self) -> Option<(&str, &str)> {
        Some((self.base_url.as_deref()?, self.webdriver_url.as_deref()?))
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads an environment variable and rejects empty values.
fn read_env_nonempty(name: &str) -> Result<Option<String>, String> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Parses a positive timeout value from an environment variable string.
fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, String> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{name} must be a positive integer number of seconds"))?;
    if secs == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

/// Parses a boolean environment variable; unset means false.
fn parse_bool_env(name: &str, raw: Option<String>) -> Result<bool, String> {
    let Some(value) = raw else {
        return Ok(false);
    };
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(format!("{name} must be 1, 0, true, or false"))
}
