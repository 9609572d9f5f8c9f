// crates/schoolsphere-config/src/connection.rs
// ============================================================================
// Module: BaaS Connection Settings
// Description: Environment resolution of endpoint, project, key, and database.
// Purpose: Fail fast with every missing variable named at once.
// Dependencies: schoolsphere-core, url
// ============================================================================

//! ## Overview
//! Connection settings come only from the environment. Each setting has a
//! primary variable and, except for the API key, a `VITE_` fallback shared
//! with the web client. Resolution goes through a lookup function so tests
//! never mutate the process environment.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fmt;

use schoolsphere_core::DatabaseId;
use url::Url;

use crate::config::ConfigError;

// ============================================================================
// SECTION: Variables
// ============================================================================

/// An environment setting with an optional fallback variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvSetting {
    /// Variable consulted first.
    pub primary: &'static str,
    /// Variable consulted when the primary is unset or blank.
    pub fallback: Option<&'static str>,
}

impl EnvSetting {
    /// Resolves the setting through `lookup`, ignoring blank values.
    fn resolve(&self, lookup: &impl Fn(&str) -> Option<String>) -> Option<String> {
        let read = |name: &str| lookup(name).map(|value| value.trim().to_string()).filter(|value| !value.is_empty());
        read(self.primary).or_else(|| self.fallback.and_then(read))
    }

    /// Describes the setting for error messages.
    fn describe(&self) -> String {
        match self.fallback {
            Some(fallback) => format!("{} (or {fallback})", self.primary),
            None => self.primary.to_string(),
        }
    }
}

/// BaaS endpoint URL.
pub const ENDPOINT: EnvSetting = EnvSetting {
    primary: "APPWRITE_ENDPOINT",
    fallback: Some("VITE_APPWRITE_ENDPOINT"),
};
/// BaaS project identifier.
pub const PROJECT_ID: EnvSetting = EnvSetting {
    primary: "APPWRITE_PROJECT_ID",
    fallback: Some("VITE_APPWRITE_PROJECT_ID"),
};
/// Server API key; never read from a client-side variable.
pub const API_KEY: EnvSetting = EnvSetting {
    primary: "APPWRITE_API_KEY",
    fallback: None,
};
/// Database identifier.
pub const DATABASE_ID: EnvSetting = EnvSetting {
    primary: "APPWRITE_DATABASE_ID",
    fallback: Some("VITE_APPWRITE_DATABASE_ID"),
};

// ============================================================================
// SECTION: Connection
// ============================================================================

/// Resolved BaaS connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct AppwriteConnection {
    /// Endpoint URL without a trailing slash.
    pub endpoint: String,
    /// Project identifier.
    pub project_id: String,
    /// Server API key.
    pub api_key: String,
    /// Database identifier.
    pub database_id: DatabaseId,
}

impl fmt::Debug for AppwriteConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppwriteConnection")
            .field("endpoint", &self.endpoint)
            .field("project_id", &self.project_id)
            .field("api_key", &"<redacted>")
            .field("database_id", &self.database_id)
            .finish()
    }
}

impl AppwriteConnection {
    /// Resolves the connection from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnv`] naming every unset variable, or
    /// [`ConfigError::Invalid`] when the endpoint is not a usable URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Resolves the connection through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingEnv`] naming every unset variable, or
    /// [`ConfigError::Invalid`] when the endpoint is not a usable URL.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let endpoint = ENDPOINT.resolve(&lookup);
        let project_id = PROJECT_ID.resolve(&lookup);
        let api_key = API_KEY.resolve(&lookup);
        let database_id = DATABASE_ID.resolve(&lookup);

        let (Some(endpoint), Some(project_id), Some(api_key), Some(database_id)) =
            (endpoint.clone(), project_id.clone(), api_key.clone(), database_id.clone())
        else {
            let missing = [
                (ENDPOINT, endpoint.is_none()),
                (PROJECT_ID, project_id.is_none()),
                (API_KEY, api_key.is_none()),
                (DATABASE_ID, database_id.is_none()),
            ]
            .into_iter()
            .filter(|(_, missing)| *missing)
            .map(|(setting, _)| setting.describe())
            .collect();
            return Err(ConfigError::MissingEnv(missing));
        };

        Ok(Self {
            endpoint: normalize_endpoint(&endpoint)?,
            project_id,
            api_key,
            database_id: DatabaseId::new(database_id),
        })
    }
}

/// Validates an endpoint URL and trims trailing slashes.
fn normalize_endpoint(raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw)
        .map_err(|err| ConfigError::Invalid(format!("{} is not a valid url: {err}", ENDPOINT.primary)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Invalid(format!(
            "{} must use http:// or https://",
            ENDPOINT.primary
        )));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(ConfigError::Invalid(format!(
            "{} must not embed credentials",
            ENDPOINT.primary
        )));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
