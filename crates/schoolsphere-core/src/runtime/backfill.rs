// crates/schoolsphere-core/src/runtime/backfill.rs
// ============================================================================
// Module: Default Backfill
// Description: Non-destructive population of missing fields on documents.
// Purpose: Give every existing document the declared default of new fields.
// Dependencies: crate::{core, interfaces, runtime::pagination}, tracing
// ============================================================================

//! ## Overview
//! The backfill reads a whole collection, then issues one partial update per
//! document that lacks at least one planned field. A field counts as missing
//! when it is absent or null; present non-null values are never overwritten.
//! Update failures are logged and counted, and the batch continues. Because
//! the missing-field check runs against current state, a second run issues
//! no writes.
//!
//! ## Invariants
//! - Update payloads only contain planned fields that were missing.
//! - In dry-run mode no update reaches the backend.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use tracing::info;
use tracing::warn;

use crate::core::CollectionId;
use crate::core::CollectionPlan;
use crate::core::Document;
use crate::core::DocumentId;
use crate::core::FieldPlan;
use crate::interfaces::BackendError;
use crate::interfaces::DatabaseBackend;
use crate::runtime::pagination::DEFAULT_PAGE_DELAY;
use crate::runtime::pagination::DEFAULT_PAGE_SIZE;
use crate::runtime::pagination::list_all_documents;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Backfill execution options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackfillOptions {
    /// Log intended updates instead of applying them.
    pub dry_run: bool,
    /// Listing page size.
    pub page_size: u32,
    /// Delay between listing pages.
    pub page_delay: Duration,
}

impl Default for BackfillOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            page_size: DEFAULT_PAGE_SIZE,
            page_delay: DEFAULT_PAGE_DELAY,
        }
    }
}

/// A document whose update was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentFailure {
    /// Document identifier.
    pub document_id: DocumentId,
    /// Backend error message.
    pub error: String,
}

/// Counters for one collection backfill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackfillReport {
    /// Collection processed.
    pub collection: CollectionId,
    /// Whether updates were only logged.
    pub dry_run: bool,
    /// Documents read.
    pub scanned: u64,
    /// Documents that lacked at least one planned field.
    pub pending: u64,
    /// Documents successfully updated.
    pub updated: u64,
    /// Documents whose update failed.
    pub failures: Vec<DocumentFailure>,
}

impl BackfillReport {
    /// Returns the number of failed updates.
    #[must_use]
    pub fn failed(&self) -> u64 {
        u64::try_from(self.failures.len()).unwrap_or(u64::MAX)
    }
}

// ============================================================================
// SECTION: Backfill
// ============================================================================

/// Builds the update payload for a document: planned fields that are absent
/// or null, mapped to their defaults.
#[must_use]
pub fn missing_field_patch(document: &Document, fields: &[FieldPlan]) -> Map<String, Value> {
    fields
        .iter()
        .filter(|field| document.is_missing(field.spec.key.as_str()))
        .map(|field| (field.spec.key.as_str().to_string(), field.default.clone()))
        .collect()
}

/// Backfills planned defaults on every document of a collection.
///
/// # Errors
///
/// Returns [`BackendError`] when the collection cannot be listed. Update
/// failures are recorded in the report instead.
pub fn backfill_collection<B: DatabaseBackend + ?Sized>(
    backend: &B,
    plan: &CollectionPlan,
    options: BackfillOptions,
) -> Result<BackfillReport, BackendError> {
    let collection = &plan.collection;
    let keys: Vec<&str> = plan.fields.iter().map(|field| field.spec.key.as_str()).collect();
    info!(collection = %collection, fields = ?keys, dry_run = options.dry_run, "backfilling defaults where missing");

    let documents =
        list_all_documents(backend, collection, options.page_size, options.page_delay)?;
    let mut report = BackfillReport {
        collection: collection.clone(),
        dry_run: options.dry_run,
        scanned: 0,
        pending: 0,
        updated: 0,
        failures: Vec::new(),
    };

    for document in &documents {
        report.scanned += 1;
        let patch = missing_field_patch(document, &plan.fields);
        if patch.is_empty() {
            continue;
        }
        report.pending += 1;
        if options.dry_run {
            info!(
                collection = %collection,
                document_id = %document.id(),
                payload = %serde_json::Value::Object(patch),
                "[dry-run] would update document"
            );
            continue;
        }
        match backend.update_document(collection, document.id(), &patch) {
            Ok(()) => report.updated += 1,
            Err(err) => {
                warn!(collection = %collection, document_id = %document.id(), error = %err, "failed to update document");
                report.failures.push(DocumentFailure {
                    document_id: document.id().clone(),
                    error: err.to_string(),
                });
            }
        }
    }

    info!(
        collection = %collection,
        scanned = report.scanned,
        pending = report.pending,
        updated = report.updated,
        failed = report.failed(),
        "backfill complete"
    );
    Ok(report)
}
