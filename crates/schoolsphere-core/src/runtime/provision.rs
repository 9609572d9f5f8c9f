// crates/schoolsphere-core/src/runtime/provision.rs
// ============================================================================
// Module: Attribute Provisioning
// Description: Idempotent creation of planned collection attributes.
// Purpose: Ensure planned fields exist without failing on re-runs.
// Dependencies: crate::{core, interfaces}, tracing
// ============================================================================

//! ## Overview
//! Provisioning attempts to create every planned attribute. A conflict means
//! the attribute already exists and is reported as [`ProvisionOutcome::Skipped`];
//! any other error is logged as a warning and recorded as
//! [`ProvisionOutcome::Failed`] so the run can continue.
//!
//! In dry-run mode nothing is created: the collection schema is read instead
//! and missing attributes are reported as [`ProvisionOutcome::Planned`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use tracing::info;
use tracing::warn;

use crate::core::AttributeKey;
use crate::core::AttributeKind;
use crate::core::AttributeSpec;
use crate::core::CollectionId;
use crate::core::MigrationPlan;
use crate::interfaces::DatabaseBackend;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Result of provisioning one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ProvisionOutcome {
    /// The attribute was created by this run.
    Created,
    /// The attribute already existed.
    Skipped,
    /// Dry run: the attribute is missing and would be created.
    Planned,
    /// Creation failed for a reason other than "already exists".
    Failed {
        /// Backend error message.
        error: String,
    },
}

impl ProvisionOutcome {
    /// Returns true for [`ProvisionOutcome::Failed`].
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

/// Provisioning outcome for a (collection, attribute) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionRecord {
    /// Target collection.
    pub collection: CollectionId,
    /// Attribute key.
    pub key: AttributeKey,
    /// Outcome of the attempt.
    #[serde(flatten)]
    pub outcome: ProvisionOutcome,
}

// ============================================================================
// SECTION: Provisioning
// ============================================================================

/// Creates a single attribute, treating "already exists" as success.
pub fn provision_attribute<B: DatabaseBackend + ?Sized>(
    backend: &B,
    collection: &CollectionId,
    spec: &AttributeSpec,
) -> ProvisionOutcome {
    let result = match &spec.kind {
        AttributeKind::String {
            size,
        } => backend.create_string_attribute(
            collection,
            &spec.key,
            *size,
            spec.required,
            spec.array,
        ),
        AttributeKind::Integer {
            min,
            max,
        } => backend.create_integer_attribute(
            collection,
            &spec.key,
            spec.required,
            *min,
            *max,
            spec.array,
        ),
    };
    match result {
        Ok(()) => {
            info!(
                collection = %collection,
                key = %spec.key,
                kind = spec.kind.label(),
                array = spec.array,
                "attribute created"
            );
            ProvisionOutcome::Created
        }
        Err(err) if err.is_conflict() => {
            info!(collection = %collection, key = %spec.key, "attribute already exists; skipped");
            ProvisionOutcome::Skipped
        }
        Err(err) => {
            warn!(collection = %collection, key = %spec.key, error = %err, "could not create attribute");
            ProvisionOutcome::Failed {
                error: err.to_string(),
            }
        }
    }
}

/// Reports what provisioning would do without creating anything.
fn preview_attribute<B: DatabaseBackend + ?Sized>(
    backend: &B,
    collection: &CollectionId,
    spec: &AttributeSpec,
) -> ProvisionOutcome {
    match backend.get_collection(collection) {
        Ok(schema) if schema.attribute(&spec.key).is_some() => {
            info!(collection = %collection, key = %spec.key, "[dry-run] attribute already exists");
            ProvisionOutcome::Skipped
        }
        Ok(_) => {
            info!(
                collection = %collection,
                key = %spec.key,
                kind = spec.kind.label(),
                array = spec.array,
                "[dry-run] would create attribute"
            );
            ProvisionOutcome::Planned
        }
        Err(err) => {
            warn!(collection = %collection, key = %spec.key, error = %err, "could not read collection schema");
            ProvisionOutcome::Failed {
                error: err.to_string(),
            }
        }
    }
}

/// Provisions every attribute of a plan in order.
pub fn provision_plan<B: DatabaseBackend + ?Sized>(
    backend: &B,
    plan: &MigrationPlan,
    dry_run: bool,
) -> Vec<ProvisionRecord> {
    info!(plan = %plan.name, dry_run, "ensuring planned attributes exist");
    let mut records = Vec::with_capacity(plan.attribute_count());
    for collection_plan in &plan.collections {
        for field in &collection_plan.fields {
            let outcome = if dry_run {
                preview_attribute(backend, &collection_plan.collection, &field.spec)
            } else {
                provision_attribute(backend, &collection_plan.collection, &field.spec)
            };
            records.push(ProvisionRecord {
                collection: collection_plan.collection.clone(),
                key: field.spec.key.clone(),
                outcome,
            });
        }
    }
    records
}
