// crates/schoolsphere-appwrite/src/lib.rs
// ============================================================================
// Module: SchoolSphere Appwrite Library
// Description: Appwrite implementation of the SchoolSphere database backend.
// Purpose: Connect the migration and backup jobs to a live Appwrite project.
// Dependencies: schoolsphere-core, reqwest, serde_json
// ============================================================================

//! ## Overview
//! This crate provides [`AppwriteClient`], a blocking REST client for the
//! Appwrite Databases API that implements
//! [`schoolsphere_core::DatabaseBackend`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::AppwriteClient;
pub use client::AppwriteClientConfig;
pub use client::KEY_HEADER;
pub use client::PROJECT_HEADER;
