// crates/schoolsphere-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payload.
// Purpose: Deterministic starting point for schoolsphere.toml.
// Dependencies: std
// ============================================================================

//! ## Overview
//! The example lists every key with its built-in default, so it parses to
//! the same values as an absent file.

/// Returns a canonical example `schoolsphere.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"# Connection secrets are read from the environment:
# APPWRITE_ENDPOINT, APPWRITE_PROJECT_ID, APPWRITE_API_KEY, APPWRITE_DATABASE_ID
# (VITE_-prefixed fallbacks are accepted for everything but the API key).

[migration]
dry_run = false
page_size = 100
page_delay_ms = 20
schema_wait_timeout_ms = 30000
schema_poll_interval_ms = 1000

[appwrite]
request_timeout_ms = 10000
# user_agent = "schoolsphere/0.1.0"

[e2e]
base_url = "http://localhost:5173"
# API server probed by `e2e smoke`; BASE_URL in the environment overrides it.
api_url = "http://127.0.0.1:5000"
webdriver_url = "http://localhost:9515"
browser = "chrome"
headless = true
default_timeout_ms = 5000
poll_interval_ms = 100
screenshot_dir = "e2e-artifacts"

[e2e.accounts.admin]
email = "admin@example.com"
password = "password123"

[e2e.accounts.teacher]
email = "teacher@example.com"
password = "password123"

[e2e.accounts.student]
email = "student@example.com"
password = "password123"
"#,
    )
}
