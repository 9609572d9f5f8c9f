// crates/schoolsphere-core/src/runtime/mod.rs
// ============================================================================
// Module: SchoolSphere Runtime
// Description: Batch jobs executed against a database backend.
// Purpose: Provision attributes, backfill defaults, and export backups.
// Dependencies: crate::{core, interfaces}, tracing
// ============================================================================

//! ## Overview
//! Runtime modules implement the single-threaded batch jobs of the toolkit.
//! Every job talks to the BaaS only through [`crate::DatabaseBackend`] and
//! logs its progress with `tracing` events.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod backfill;
pub mod backup;
pub mod memory;
pub mod migration;
pub mod pagination;
pub mod provision;
pub mod schema_wait;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use backfill::BackfillOptions;
pub use backfill::BackfillReport;
pub use backfill::DocumentFailure;
pub use backfill::backfill_collection;
pub use backfill::missing_field_patch;
pub use backup::BackupError;
pub use backup::BackupManifest;
pub use backup::BackupOptions;
pub use backup::CollectionBackup;
pub use backup::export_database;
pub use backup::export_database_at;
pub use backup::read_collection_backup;
pub use memory::InMemoryDatabase;
pub use memory::WriteCounters;
pub use migration::CollectionFailure;
pub use migration::MigrationError;
pub use migration::MigrationOptions;
pub use migration::MigrationReport;
pub use migration::MigrationRunner;
pub use pagination::DEFAULT_PAGE_DELAY;
pub use pagination::DEFAULT_PAGE_SIZE;
pub use pagination::DocumentPager;
pub use pagination::list_all_collections;
pub use pagination::list_all_documents;
pub use provision::ProvisionOutcome;
pub use provision::ProvisionRecord;
pub use provision::provision_attribute;
pub use provision::provision_plan;
pub use schema_wait::WaitPolicy;
pub use schema_wait::WaitRecord;
pub use schema_wait::wait_for_attribute;
