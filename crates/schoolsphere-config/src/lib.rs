// crates/schoolsphere-config/src/lib.rs
// ============================================================================
// Module: SchoolSphere Config Library
// Description: Connection settings and tunables for the operations toolkit.
// Purpose: Single source of truth for environment and schoolsphere.toml semantics.
// Dependencies: schoolsphere-core, serde, toml, url
// ============================================================================

//! ## Overview
//! `schoolsphere-config` resolves two kinds of settings:
//! - BaaS connection secrets, read from environment variables with `VITE_`
//!   fallbacks so the same `.env` file serves the web client and the tools,
//! - optional tunables for the migration, the REST client, and the UI
//!   scenario runner, read from a strictly validated TOML file.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod connection;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use connection::AppwriteConnection;
pub use connection::EnvSetting;
pub use examples::config_toml_example;
