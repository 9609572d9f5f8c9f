// crates/schoolsphere-cli/src/lib.rs
// ============================================================================
// Module: SchoolSphere CLI Library
// Description: Shared helpers for the SchoolSphere command-line interface.
// Purpose: Provide reusable components for the CLI binary and its tests.
// Dependencies: schoolsphere-{core,config,appwrite,e2e}, tracing-subscriber
// ============================================================================

//! ## Overview
//! This library houses the pieces of the `schoolsphere` binary that are
//! worth testing on their own: the message catalog behind [`t!`], logging
//! setup, text rendering of reports, and the mapping from loaded
//! configuration onto runtime settings. The binary entry point
//! (`src/main.rs`) only parses arguments and dispatches.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Message catalog and the `t!` macro.
pub mod i18n;
/// Tracing subscriber installation.
pub mod logging;
/// Human-readable report rendering.
pub mod render;
/// Configuration-to-runtime mapping.
pub mod wiring;
