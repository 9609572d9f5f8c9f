// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for SchoolSphere system-tests.
// Purpose: Provide CLI invocation, a fake Appwrite server, and artifacts.
// Dependencies: system-tests, tiny_http, tempfile
// ============================================================================

//! ## Overview
//! Shared helpers for SchoolSphere system-tests.
//! Invariants:
//! - Offline suites never reach the network beyond loopback.
//! - Live suites skip unless their targets are configured.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod artifacts;
pub mod cli;
pub mod fake_appwrite;
