// crates/schoolsphere-core/src/lib.rs
// ============================================================================
// Module: SchoolSphere Core Library
// Description: Public API surface for the SchoolSphere operations core.
// Purpose: Expose the migration plan, backend interface, and runtime jobs.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! SchoolSphere core holds the backend-agnostic pieces of the operations
//! toolkit: the phase-1 attribute plan for the `exams` and `examAttempts`
//! collections, the [`DatabaseBackend`] interface every BaaS client
//! implements, and the batch jobs (provisioning, schema wait, paginated
//! backfill, backup export) that run on top of it.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::BackendError;
pub use interfaces::DatabaseBackend;
pub use runtime::BackfillOptions;
pub use runtime::BackfillReport;
pub use runtime::BackupError;
pub use runtime::BackupManifest;
pub use runtime::BackupOptions;
pub use runtime::CollectionFailure;
pub use runtime::DocumentPager;
pub use runtime::InMemoryDatabase;
pub use runtime::MigrationError;
pub use runtime::MigrationOptions;
pub use runtime::MigrationReport;
pub use runtime::MigrationRunner;
pub use runtime::ProvisionOutcome;
pub use runtime::ProvisionRecord;
pub use runtime::WaitPolicy;
pub use runtime::WaitRecord;
pub use runtime::WriteCounters;
