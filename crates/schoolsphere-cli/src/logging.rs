// crates/schoolsphere-cli/src/logging.rs
// ============================================================================
// Module: CLI Logging
// Description: Tracing subscriber setup for the schoolsphere binary.
// Purpose: Route structured diagnostics to stderr in text or JSON form.
// Dependencies: tracing-subscriber
// ============================================================================

//! ## Overview
//! Diagnostics go to stderr so that stdout stays reserved for command
//! output (including `--format json` reports). The filter is read from
//! `SCHOOLSPHERE_LOG` using the usual `EnvFilter` directive syntax and
//! defaults to `info`.

use clap::ValueEnum;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives.
pub const LOG_ENV_VAR: &str = "SCHOOLSPHERE_LOG";

/// Filter used when [`LOG_ENV_VAR`] is unset or invalid.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Log line encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Builds the filter from the environment, falling back to `info`.
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns a message when a global subscriber is already installed.
pub fn init_tracing(format: LogFormat) -> Result<(), String> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_target(false);
    let result = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|err| err.to_string())
}
