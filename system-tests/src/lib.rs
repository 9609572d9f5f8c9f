// system-tests/src/lib.rs
// ============================================================================
// Module: SchoolSphere System Tests Library
// Description: Shared configuration for system test scenarios.
// Purpose: Provide common utilities for SchoolSphere system-test binaries.
// Dependencies: std
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration used by the SchoolSphere
//! system-tests binaries in `system-tests/tests`. Suites that touch a real
//! Appwrite project or a real browser read their targets from the
//! environment and skip when those are absent.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
