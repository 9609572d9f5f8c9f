//! Config loading and validation tests for schoolsphere-config.
// crates/schoolsphere-config/tests/config_loading.rs
// =============================================================================
// Module: Config Loading and Validation Tests
// Description: Validate file resolution, defaults, and range checks.
// Purpose: Ensure typos and out-of-range tunables are rejected up front.
// =============================================================================

use std::fs;
use std::time::Duration;

use schoolsphere_config::BrowserKind;
use schoolsphere_config::ConfigError;
use schoolsphere_config::SchoolSphereConfig;
use schoolsphere_config::config_toml_example;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<SchoolSphereConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn empty_file_yields_defaults() -> TestResult {
    let config = SchoolSphereConfig::from_toml_str("").map_err(|err| err.to_string())?;
    if config != SchoolSphereConfig::default() {
        return Err("empty config should equal defaults".to_string());
    }
    let options = config.migration.options(false);
    if options.page_size != 100 || options.page_delay != Duration::from_millis(20) {
        return Err(format!("unexpected paging defaults {options:?}"));
    }
    if options.wait.timeout != Duration::from_secs(30) || options.dry_run {
        return Err(format!("unexpected wait defaults {options:?}"));
    }
    if config.e2e.browser != BrowserKind::Chrome || config.e2e.accounts.teacher.email != "teacher@example.com" {
        return Err("unexpected e2e defaults".to_string());
    }
    if config.e2e.api_url != "http://127.0.0.1:5000" || config.e2e.api_url == config.e2e.base_url {
        return Err(format!("api server must default apart from the web app, got {}", config.e2e.api_url));
    }
    Ok(())
}

#[test]
fn example_config_matches_defaults() -> TestResult {
    let config = SchoolSphereConfig::from_toml_str(&config_toml_example()).map_err(|err| err.to_string())?;
    if config != SchoolSphereConfig::default() {
        return Err("example config drifted from defaults".to_string());
    }
    Ok(())
}

#[test]
fn cli_dry_run_overrides_file() -> TestResult {
    let config = SchoolSphereConfig::from_toml_str("[migration]\ndry_run = false\n")
        .map_err(|err| err.to_string())?;
    if !config.migration.options(true).dry_run {
        return Err("--dry-run must force dry-run mode".to_string());
    }
    Ok(())
}

#[test]
fn unknown_keys_are_rejected() -> TestResult {
    assert_invalid(SchoolSphereConfig::from_toml_str("[migration]\npage_sise = 10\n"), "page_sise")?;
    assert_invalid(SchoolSphereConfig::from_toml_str("[backups]\nout = \"x\"\n"), "backups")
}

#[test]
fn page_size_is_bounded_by_the_backend_limit() -> TestResult {
    assert_invalid(SchoolSphereConfig::from_toml_str("[migration]\npage_size = 0\n"), "page_size")?;
    assert_invalid(SchoolSphereConfig::from_toml_str("[migration]\npage_size = 101\n"), "page_size")
}

#[test]
fn schema_wait_bounds_are_enforced() -> TestResult {
    assert_invalid(
        SchoolSphereConfig::from_toml_str("[migration]\nschema_wait_timeout_ms = 60001\n"),
        "schema_wait_timeout_ms",
    )?;
    assert_invalid(
        SchoolSphereConfig::from_toml_str("[migration]\nschema_poll_interval_ms = 10\n"),
        "schema_poll_interval_ms",
    )?;
    assert_invalid(
        SchoolSphereConfig::from_toml_str(
            "[migration]\nschema_wait_timeout_ms = 500\nschema_poll_interval_ms = 1000\n",
        ),
        "must not exceed",
    )
}

#[test]
fn request_timeout_and_urls_are_validated() -> TestResult {
    assert_invalid(
        SchoolSphereConfig::from_toml_str("[appwrite]\nrequest_timeout_ms = 50\n"),
        "request_timeout_ms",
    )?;
    assert_invalid(SchoolSphereConfig::from_toml_str("[e2e]\nbase_url = \"localhost\"\n"), "e2e.base_url")?;
    assert_invalid(SchoolSphereConfig::from_toml_str("[e2e]\napi_url = \"127.0.0.1:5000\"\n"), "e2e.api_url")?;
    assert_invalid(
        SchoolSphereConfig::from_toml_str("[e2e]\nwebdriver_url = \"ws://127.0.0.1:9515\"\n"),
        "e2e.webdriver_url",
    )
}

#[test]
fn account_overrides_keep_other_roles() -> TestResult {
    let config = SchoolSphereConfig::from_toml_str(
        "[e2e.accounts.admin]\nemail = \"root@school.test\"\npassword = \"hunter2\"\n",
    )
    .map_err(|err| err.to_string())?;
    if config.e2e.accounts.admin.email != "root@school.test" {
        return Err("admin override ignored".to_string());
    }
    if config.e2e.accounts.student.email != "student@example.com" {
        return Err("student default lost".to_string());
    }
    assert_invalid(
        SchoolSphereConfig::from_toml_str("[e2e.accounts.admin]\nemail = \"\"\npassword = \"x\"\n"),
        "e2e.accounts.admin",
    )
}

#[test]
fn missing_default_file_falls_back_to_defaults() -> TestResult {
    let config = SchoolSphereConfig::load_with_env(None, no_env).map_err(|err| err.to_string())?;
    if config.source.is_some() || config != SchoolSphereConfig::default() {
        return Err("absent default file should yield built-in defaults".to_string());
    }
    Ok(())
}

#[test]
fn missing_explicit_file_is_an_error() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let missing = dir.path().join("absent.toml");
    match SchoolSphereConfig::load_with_env(Some(&missing), no_env) {
        Err(ConfigError::Io(_)) => {}
        other => return Err(format!("expected io error, got {other:?}")),
    }
    let from_env = missing.display().to_string();
    match SchoolSphereConfig::load_with_env(None, |name| {
        (name == "SCHOOLSPHERE_CONFIG").then(|| from_env.clone())
    }) {
        Err(ConfigError::Io(_)) => Ok(()),
        other => Err(format!("expected io error for env path, got {other:?}")),
    }
}

#[test]
fn file_is_loaded_from_env_path() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("ops.toml");
    fs::write(&path, "[migration]\ndry_run = true\npage_size = 25\n").map_err(|err| err.to_string())?;
    let env_value = path.display().to_string();
    let config = SchoolSphereConfig::load_with_env(None, |name| {
        (name == "SCHOOLSPHERE_CONFIG").then(|| env_value.clone())
    })
    .map_err(|err| err.to_string())?;
    if !config.migration.dry_run || config.migration.page_size != 25 {
        return Err("env config not applied".to_string());
    }
    if config.source.as_deref() != Some(path.as_path()) {
        return Err("source path not recorded".to_string());
    }
    Ok(())
}

#[test]
fn oversized_and_non_utf8_files_are_rejected() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let big = dir.path().join("big.toml");
    fs::write(&big, vec![b'#'; 1024 * 1024 + 1]).map_err(|err| err.to_string())?;
    assert_invalid(SchoolSphereConfig::load_with_env(Some(&big), no_env), "size limit")?;

    let binary = dir.path().join("binary.toml");
    fs::write(&binary, [0xff, 0xfe, 0x00]).map_err(|err| err.to_string())?;
    assert_invalid(SchoolSphereConfig::load_with_env(Some(&binary), no_env), "utf-8")
}
