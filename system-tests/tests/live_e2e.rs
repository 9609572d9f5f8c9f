// system-tests/tests/live_e2e.rs
// ============================================================================
// Module: Live UI Suite
// Description: Aggregates browser scenario tests against a running app.
// Purpose: Run catalog scenarios through a real WebDriver server.
// Dependencies: suites/*, helpers
// ============================================================================

//! ## Overview
//! Aggregates live UI scenario system tests into one binary.

mod helpers;

#[path = "suites/live_e2e.rs"]
mod live_e2e;
