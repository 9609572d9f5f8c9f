// crates/schoolsphere-config/src/config.rs
// ============================================================================
// Module: SchoolSphere Configuration
// Description: Loading and validation of schoolsphere.toml tunables.
// Purpose: Provide strict config parsing with hard limits and safe defaults.
// Dependencies: schoolsphere-core, serde, thiserror, toml, url
// ============================================================================

//! ## Overview
//! The TOML file is optional. Resolution order is an explicit path, then
//! `SCHOOLSPHERE_CONFIG`, then `schoolsphere.toml` in the working directory.
//! A missing default file yields built-in defaults; a missing explicit file
//! is an error. Files are size-limited, must be UTF-8, and unknown keys are
//! rejected so typos never silently fall back to defaults.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fmt;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use schoolsphere_core::MigrationOptions;
use schoolsphere_core::WaitPolicy;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "schoolsphere.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "SCHOOLSPHERE_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;

/// Largest page the BaaS accepts per listing call.
pub(crate) const MAX_PAGE_SIZE: u32 = 100;
/// Maximum delay between listing pages.
pub(crate) const MAX_PAGE_DELAY_MS: u64 = 5_000;
/// Maximum schema visibility wait.
pub(crate) const MAX_SCHEMA_WAIT_TIMEOUT_MS: u64 = 60_000;
/// Minimum interval between schema polls.
pub(crate) const MIN_SCHEMA_POLL_INTERVAL_MS: u64 = 50;
/// Minimum REST request timeout.
pub(crate) const MIN_REQUEST_TIMEOUT_MS: u64 = 100;
/// Maximum REST request timeout.
pub(crate) const MAX_REQUEST_TIMEOUT_MS: u64 = 120_000;
/// Minimum UI expectation timeout.
pub(crate) const MIN_UI_TIMEOUT_MS: u64 = 100;
/// Maximum UI expectation timeout.
pub(crate) const MAX_UI_TIMEOUT_MS: u64 = 120_000;
/// Minimum UI polling interval.
pub(crate) const MIN_UI_POLL_INTERVAL_MS: u64 = 10;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// SchoolSphere toolkit configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchoolSphereConfig {
    /// Migration tunables.
    #[serde(default)]
    pub migration: MigrationConfig,
    /// REST client tunables.
    #[serde(default)]
    pub appwrite: AppwriteConfig,
    /// UI scenario runner settings.
    #[serde(default)]
    pub e2e: E2eConfig,
    /// Path the configuration was loaded from, if any.
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl SchoolSphereConfig {
    /// Loads configuration using the default resolution rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |name| env::var(name).ok())
    }

    /// Loads configuration, reading `SCHOOLSPHERE_CONFIG` through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load_with_env(
        path: Option<&Path>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let (resolved, explicit) = resolve_path(path, &lookup)?;
        validate_path(&resolved)?;
        if !explicit && !resolved.exists() {
            return Ok(Self::default());
        }
        let bytes = fs::read(&resolved)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", resolved.display())))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let mut config = Self::from_toml_str(content)?;
        config.source = Some(resolved);
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.migration.validate()?;
        self.appwrite.validate()?;
        self.e2e.validate()
    }
}

// ============================================================================
// SECTION: Migration
// ============================================================================

/// `[migration]` tunables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MigrationConfig {
    /// Log intended changes instead of applying them.
    pub dry_run: bool,
    /// Listing page size.
    pub page_size: u32,
    /// Delay between listing pages in milliseconds.
    pub page_delay_ms: u64,
    /// Visibility wait budget for new attributes in milliseconds.
    pub schema_wait_timeout_ms: u64,
    /// Interval between schema polls in milliseconds.
    pub schema_poll_interval_ms: u64,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            dry_run: false,
            page_size: 100,
            page_delay_ms: 20,
            schema_wait_timeout_ms: 30_000,
            schema_poll_interval_ms: 1_000,
        }
    }
}

impl MigrationConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(1 ..= MAX_PAGE_SIZE).contains(&self.page_size) {
            return Err(ConfigError::Invalid(format!(
                "migration.page_size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        if self.page_delay_ms > MAX_PAGE_DELAY_MS {
            return Err(ConfigError::Invalid(format!(
                "migration.page_delay_ms must be at most {MAX_PAGE_DELAY_MS}"
            )));
        }
        if self.schema_wait_timeout_ms > MAX_SCHEMA_WAIT_TIMEOUT_MS {
            return Err(ConfigError::Invalid(format!(
                "migration.schema_wait_timeout_ms must be at most {MAX_SCHEMA_WAIT_TIMEOUT_MS}"
            )));
        }
        if self.schema_poll_interval_ms < MIN_SCHEMA_POLL_INTERVAL_MS {
            return Err(ConfigError::Invalid(format!(
                "migration.schema_poll_interval_ms must be at least {MIN_SCHEMA_POLL_INTERVAL_MS}"
            )));
        }
        if self.schema_poll_interval_ms > self.schema_wait_timeout_ms {
            return Err(ConfigError::Invalid(
                "migration.schema_poll_interval_ms must not exceed schema_wait_timeout_ms"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Returns runner options, with `dry_run` forced on when requested.
    #[must_use]
    pub const fn options(&self, force_dry_run: bool) -> MigrationOptions {
        MigrationOptions {
            dry_run: self.dry_run || force_dry_run,
            page_size: self.page_size,
            page_delay: Duration::from_millis(self.page_delay_ms),
            wait: WaitPolicy {
                timeout: Duration::from_millis(self.schema_wait_timeout_ms),
                poll_interval: Duration::from_millis(self.schema_poll_interval_ms),
            },
        }
    }
}

// ============================================================================
// SECTION: REST Client
// ============================================================================

/// `[appwrite]` REST client tunables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppwriteConfig {
    /// Per-request timeout in milliseconds.
    pub request_timeout_ms: u64,
    /// User-Agent header sent with every request.
    pub user_agent: String,
}

impl Default for AppwriteConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 10_000,
            user_agent: concat!("schoolsphere/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl AppwriteConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_REQUEST_TIMEOUT_MS ..= MAX_REQUEST_TIMEOUT_MS).contains(&self.request_timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "appwrite.request_timeout_ms must be between {MIN_REQUEST_TIMEOUT_MS} and \
                 {MAX_REQUEST_TIMEOUT_MS}"
            )));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid("appwrite.user_agent must be non-empty".to_string()));
        }
        Ok(())
    }

    /// Returns the request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

// ============================================================================
// SECTION: UI Scenarios
// ============================================================================

/// Browser driven by the WebDriver server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    /// Chrome or Chromium via chromedriver.
    #[default]
    Chrome,
    /// Firefox via geckodriver.
    Firefox,
}

/// Login credentials for one seeded account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccountConfig {
    /// Login email.
    pub email: String,
    /// Login password.
    pub password: String,
}

impl fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountConfig")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl AccountConfig {
    fn seeded(email: &str) -> Self {
        Self {
            email: email.to_string(),
            password: "password123".to_string(),
        }
    }
}

/// `[e2e.accounts]` credentials per role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccountsConfig {
    /// Administrator account.
    pub admin: AccountConfig,
    /// Teacher account.
    pub teacher: AccountConfig,
    /// Student account.
    pub student: AccountConfig,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            admin: AccountConfig::seeded("admin@example.com"),
            teacher: AccountConfig::seeded("teacher@example.com"),
            student: AccountConfig::seeded("student@example.com"),
        }
    }
}

/// `[e2e]` scenario runner settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct E2eConfig {
    /// Base URL of the web application under test.
    pub base_url: String,
    /// Base URL of the API server that answers `/health`.
    pub api_url: String,
    /// WebDriver server URL.
    pub webdriver_url: String,
    /// Browser to drive.
    pub browser: BrowserKind,
    /// Run the browser without a window.
    pub headless: bool,
    /// Default expectation timeout in milliseconds.
    pub default_timeout_ms: u64,
    /// Interval between expectation polls in milliseconds.
    pub poll_interval_ms: u64,
    /// Directory for failure and step screenshots.
    pub screenshot_dir: PathBuf,
    /// Seeded accounts per role.
    pub accounts: AccountsConfig,
}

impl Default for E2eConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5173".to_string(),
            api_url: "http://127.0.0.1:5000".to_string(),
            webdriver_url: "http://localhost:9515".to_string(),
            browser: BrowserKind::Chrome,
            headless: true,
            default_timeout_ms: 5_000,
            poll_interval_ms: 100,
            screenshot_dir: PathBuf::from("e2e-artifacts"),
            accounts: AccountsConfig::default(),
        }
    }
}

impl E2eConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        validate_http_url("e2e.base_url", &self.base_url)?;
        validate_http_url("e2e.api_url", &self.api_url)?;
        validate_http_url("e2e.webdriver_url", &self.webdriver_url)?;
        if !(MIN_UI_TIMEOUT_MS ..= MAX_UI_TIMEOUT_MS).contains(&self.default_timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "e2e.default_timeout_ms must be between {MIN_UI_TIMEOUT_MS} and {MAX_UI_TIMEOUT_MS}"
            )));
        }
        if self.poll_interval_ms < MIN_UI_POLL_INTERVAL_MS
            || self.poll_interval_ms > self.default_timeout_ms
        {
            return Err(ConfigError::Invalid(format!(
                "e2e.poll_interval_ms must be between {MIN_UI_POLL_INTERVAL_MS} and \
                 e2e.default_timeout_ms"
            )));
        }
        validate_path_string("e2e.screenshot_dir", &self.screenshot_dir.to_string_lossy())?;
        for (role, account) in [
            ("admin", &self.accounts.admin),
            ("teacher", &self.accounts.teacher),
            ("student", &self.accounts.student),
        ] {
            if account.email.trim().is_empty() || account.password.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "e2e.accounts.{role} requires email and password"
                )));
            }
        }
        Ok(())
    }

    /// Returns the default expectation timeout.
    #[must_use]
    pub const fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    /// Returns the expectation polling interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// Required environment variables are unset.
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingEnv(Vec<String>),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path and whether it was requested explicitly.
fn resolve_path(
    path: Option<&Path>,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Result<(PathBuf, bool), ConfigError> {
    if let Some(path) = path {
        return Ok((path.to_path_buf(), true));
    }
    if let Some(env_path) = lookup(CONFIG_ENV_VAR).filter(|value| !value.trim().is_empty()) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok((PathBuf::from(env_path), true));
    }
    Ok((PathBuf::from(DEFAULT_CONFIG_NAME), false))
}

/// Validates the resolved path against length limits.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    for component in Path::new(trimmed).components() {
        if component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates that a setting is an absolute http(s) URL.
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|err| ConfigError::Invalid(format!("{field} is not a valid url: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid(format!("{field} must use http:// or https://")));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::use_debug, reason = "Test assertions.")]

    use super::*;

    #[test]
    fn validate_path_string_rejects_empty_string() {
        let result = validate_path_string("test_path", "  ");
        assert!(result.unwrap_err().to_string().contains("non-empty"));
    }

    #[test]
    fn validate_path_string_rejects_long_component() {
        let component = "a".repeat(MAX_PATH_COMPONENT_LENGTH + 1);
        let result = validate_path_string("test_path", &format!("out/{component}"));
        assert!(result.unwrap_err().to_string().contains("component too long"));
    }

    #[test]
    fn explicit_path_beats_environment() {
        let (path, explicit) = resolve_path(Some(Path::new("cli.toml")), &|_: &str| {
            Some("env.toml".to_string())
        })
        .unwrap();
        assert_eq!(path, PathBuf::from("cli.toml"));
        assert!(explicit);
    }

    #[test]
    fn default_path_is_not_explicit() {
        let (path, explicit) = resolve_path(None, &|_: &str| None).unwrap();
        assert_eq!(path, PathBuf::from(DEFAULT_CONFIG_NAME));
        assert!(!explicit);
    }

    #[test]
    fn account_debug_hides_password() {
        let accounts = AccountsConfig::default();
        let rendered = format!("{accounts:?}");
        assert!(rendered.contains("admin@example.com"));
        assert!(!rendered.contains("password123"));
    }
}
