// crates/schoolsphere-core/src/runtime/migration.rs
// ============================================================================
// Module: Migration Runner
// Description: End-to-end execution of an attribute migration plan.
// Purpose: Connect, provision, wait for visibility, and backfill in order.
// Dependencies: crate::{core, interfaces, runtime}, thiserror, tracing
// ============================================================================

//! ## Overview
//! [`MigrationRunner::run`] executes a [`MigrationPlan`] in four sequential
//! phases:
//! 1. connectivity check (the only fatal step),
//! 2. attribute provisioning,
//! 3. a bounded visibility wait for each attribute created by this run,
//! 4. a default backfill per collection, in plan order.
//!
//! Everything after the connectivity check is best-effort: failures are
//! logged and summarized in the [`MigrationReport`]. No step retries; the
//! whole run is safe to repeat.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use tracing::info;
use tracing::warn;

use crate::core::CollectionId;
use crate::core::DatabaseId;
use crate::core::MigrationPlan;
use crate::interfaces::BackendError;
use crate::interfaces::DatabaseBackend;
use crate::runtime::backfill::BackfillOptions;
use crate::runtime::backfill::BackfillReport;
use crate::runtime::backfill::backfill_collection;
use crate::runtime::pagination::DEFAULT_PAGE_DELAY;
use crate::runtime::pagination::DEFAULT_PAGE_SIZE;
use crate::runtime::provision::ProvisionOutcome;
use crate::runtime::provision::ProvisionRecord;
use crate::runtime::provision::provision_plan;
use crate::runtime::schema_wait::WaitPolicy;
use crate::runtime::schema_wait::WaitRecord;
use crate::runtime::schema_wait::wait_for_attribute;

// ============================================================================
// SECTION: Options
// ============================================================================

/// Migration execution options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationOptions {
    /// Log intended changes instead of applying them.
    pub dry_run: bool,
    /// Listing page size.
    pub page_size: u32,
    /// Delay between listing pages.
    pub page_delay: Duration,
    /// Visibility wait budget for freshly created attributes.
    pub wait: WaitPolicy,
}

impl Default for MigrationOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            page_size: DEFAULT_PAGE_SIZE,
            page_delay: DEFAULT_PAGE_DELAY,
            wait: WaitPolicy::default(),
        }
    }
}

impl MigrationOptions {
    /// Returns the backfill options derived from these options.
    #[must_use]
    pub const fn backfill(&self) -> BackfillOptions {
        BackfillOptions {
            dry_run: self.dry_run,
            page_size: self.page_size,
            page_delay: self.page_delay,
        }
    }
}

// ============================================================================
// SECTION: Report
// ============================================================================

/// A collection whose documents could not be listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionFailure {
    /// Collection identifier.
    pub collection: CollectionId,
    /// Backend error message.
    pub error: String,
}

/// Summary of a migration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReport {
    /// Plan name.
    pub plan: String,
    /// Database migrated.
    pub database: DatabaseId,
    /// Whether changes were only logged.
    pub dry_run: bool,
    /// Provisioning outcome per attribute.
    pub provisioning: Vec<ProvisionRecord>,
    /// Visibility waits performed.
    pub waits: Vec<WaitRecord>,
    /// Backfill counters per collection.
    pub backfills: Vec<BackfillReport>,
    /// Collections that could not be listed.
    pub collection_failures: Vec<CollectionFailure>,
}

impl MigrationReport {
    /// Returns true when any non-fatal step failed or timed out.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.provisioning.iter().any(|record| record.outcome.is_failed())
            || self.waits.iter().any(|wait| !wait.visible)
            || self.backfills.iter().any(|backfill| !backfill.failures.is_empty())
            || !self.collection_failures.is_empty()
    }

    /// Returns the number of documents updated across all collections.
    #[must_use]
    pub fn total_updated(&self) -> u64 {
        self.backfills.iter().map(|backfill| backfill.updated).sum()
    }

    /// Returns the backfill counters for a collection.
    #[must_use]
    pub fn backfill(&self, collection: &CollectionId) -> Option<&BackfillReport> {
        self.backfills.iter().find(|backfill| &backfill.collection == collection)
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Fatal migration errors.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The initial connectivity check failed.
    #[error("database connection failed: {0}")]
    Connectivity(BackendError),
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Executes migration plans against a backend.
pub struct MigrationRunner<B> {
    /// Backend the plan is applied to.
    backend: B,
    /// Execution options.
    options: MigrationOptions,
}

impl<B: DatabaseBackend> MigrationRunner<B> {
    /// Creates a runner.
    #[must_use]
    pub const fn new(backend: B, options: MigrationOptions) -> Self {
        Self {
            backend,
            options,
        }
    }

    /// Returns the backend.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Runs the plan.
    ///
    /// # Errors
    ///
    /// Returns [`MigrationError::Connectivity`] when the database cannot be
    /// reached; nothing is attempted after that.
    pub fn run(&self, plan: &MigrationPlan) -> Result<MigrationReport, MigrationError> {
        let database = self.backend.get_database().map_err(MigrationError::Connectivity)?;
        info!(database = %database.id, plan = %plan.name, dry_run = self.options.dry_run, "connected");

        let provisioning = provision_plan(&self.backend, plan, self.options.dry_run);

        let waits: Vec<WaitRecord> = provisioning
            .iter()
            .filter(|record| record.outcome == ProvisionOutcome::Created)
            .map(|record| {
                wait_for_attribute(&self.backend, &record.collection, &record.key, self.options.wait)
            })
            .collect();

        let mut backfills = Vec::with_capacity(plan.collections.len());
        let mut collection_failures = Vec::new();
        for collection_plan in &plan.collections {
            match backfill_collection(&self.backend, collection_plan, self.options.backfill()) {
                Ok(report) => backfills.push(report),
                Err(err) => {
                    warn!(collection = %collection_plan.collection, error = %err, "could not list documents; collection skipped");
                    collection_failures.push(CollectionFailure {
                        collection: collection_plan.collection.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }

        let report = MigrationReport {
            plan: plan.name.clone(),
            database: database.id,
            dry_run: self.options.dry_run,
            provisioning,
            waits,
            backfills,
            collection_failures,
        };
        info!(updated = report.total_updated(), has_failures = report.has_failures(), "migration finished");
        Ok(report)
    }
}
