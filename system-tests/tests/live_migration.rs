// system-tests/tests/live_migration.rs
// ============================================================================
// Module: Live Migration Suite
// Description: Aggregates migration tests against a real Appwrite project.
// Purpose: Verify idempotence against the real BaaS when explicitly enabled.
// Dependencies: suites/*, helpers
// ============================================================================

//! ## Overview
//! Aggregates live migration system tests into one binary.

mod helpers;

#[path = "suites/live_migration.rs"]
mod live_migration;
