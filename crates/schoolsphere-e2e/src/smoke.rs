// crates/schoolsphere-e2e/src/smoke.rs
// ============================================================================
// Module: Smoke Probe
// Description: Health check against the application server.
// Purpose: Cheap pre-flight check before running browser scenarios.
// Dependencies: reqwest, serde, serde_json, tracing, url
// ============================================================================

//! ## Overview
//! [`probe_health`] calls `GET <base_url>/health` and expects a 2xx JSON
//! body with `"status": "ok"`. A server that refuses the connection is a
//! soft pass ([`SmokeOutcome::Skipped`]) so CI without a running server is
//! not blocked; every other problem is a failure.

use std::io::Read;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::redirect::Policy;
use serde::Serialize;
use serde_json::Value;
use tracing::info;
use tracing::warn;
use url::Url;

/// Largest health response body that is parsed.
const MAX_HEALTH_BODY_BYTES: usize = 64 * 1024;

/// Result of a smoke probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum SmokeOutcome {
    /// The server reported itself healthy.
    Healthy,
    /// The server was not reachable; nothing was checked.
    Skipped(String),
    /// The server answered incorrectly.
    Failed(String),
}

impl SmokeOutcome {
    /// Returns true unless the probe failed.
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }
}

/// Returns `<base_url>/health`, keeping any path on the base.
fn health_url(base_url: &str) -> Result<Url, url::ParseError> {
    let mut base = Url::parse(base_url)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("health")
}

/// Probes `<base_url>/health`.
#[must_use]
pub fn probe_health(base_url: &str, timeout: Duration) -> SmokeOutcome {
    let url = match health_url(base_url) {
        Ok(url) => url,
        Err(err) => return SmokeOutcome::Failed(format!("invalid base url {base_url}: {err}")),
    };
    let client = match Client::builder().timeout(timeout).redirect(Policy::none()).build() {
        Ok(client) => client,
        Err(err) => return SmokeOutcome::Failed(format!("http client build failed: {err}")),
    };
    let response = match client.get(url.clone()).send() {
        Ok(response) => response,
        Err(err) if err.is_connect() => {
            warn!(url = %url, error = %err, "server not reachable, skipping health check");
            return SmokeOutcome::Skipped(format!("server not reachable at {url}"));
        }
        Err(err) => return SmokeOutcome::Failed(format!("health request failed: {err}")),
    };
    let status = response.status();
    if !status.is_success() {
        return SmokeOutcome::Failed(format!("health check failed with status {}", status.as_u16()));
    }
    let limit = u64::try_from(MAX_HEALTH_BODY_BYTES).unwrap_or(u64::MAX).saturating_add(1);
    let mut body = Vec::new();
    if let Err(err) = response.take(limit).read_to_end(&mut body) {
        return SmokeOutcome::Failed(format!("health body unreadable: {err}"));
    }
    if body.len() > MAX_HEALTH_BODY_BYTES {
        return SmokeOutcome::Failed("health response too large".to_string());
    }
    let healthy = serde_json::from_slice::<Value>(&body)
        .ok()
        .is_some_and(|value| value.get("status").and_then(Value::as_str) == Some("ok"));
    if !healthy {
        return SmokeOutcome::Failed("unexpected health response".to_string());
    }
    info!(url = %url, "health check ok");
    SmokeOutcome::Healthy
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test assertions.")]

    use super::*;

    #[test]
    fn health_url_appends_to_base_path() {
        assert_eq!(health_url("http://127.0.0.1:5000").unwrap().as_str(), "http://127.0.0.1:5000/health");
        assert_eq!(health_url("http://host/app").unwrap().as_str(), "http://host/app/health");
        assert_eq!(health_url("http://host/app/").unwrap().as_str(), "http://host/app/health");
    }
}
