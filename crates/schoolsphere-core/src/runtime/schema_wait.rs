// crates/schoolsphere-core/src/runtime/schema_wait.rs
// ============================================================================
// Module: Schema Visibility Wait
// Description: Bounded polling for newly created attributes.
// Purpose: Absorb the BaaS eventual-consistency window before backfilling.
// Dependencies: crate::{core, interfaces}, tracing
// ============================================================================

//! ## Overview
//! Attributes created through the BaaS are processed asynchronously. Before
//! writing to a fresh attribute the migration polls the collection schema at
//! a fixed interval until the attribute is listed as available or the budget
//! runs out. Running out is not an error: the caller proceeds and per-document
//! update failures are logged individually.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::thread;
use std::time::Duration;
use std::time::Instant;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::core::AttributeKey;
use crate::core::CollectionId;
use crate::interfaces::DatabaseBackend;

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Default time budget for attribute visibility.
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(30);
/// Default interval between schema polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Polling budget for schema visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Total time budget.
    pub timeout: Duration,
    /// Delay between polls.
    pub poll_interval: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_WAIT_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Result of waiting for one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaitRecord {
    /// Collection polled.
    pub collection: CollectionId,
    /// Attribute waited for.
    pub key: AttributeKey,
    /// Whether the attribute became visible within the budget.
    pub visible: bool,
    /// Number of schema reads performed.
    pub polls: u32,
}

// ============================================================================
// SECTION: Wait
// ============================================================================

/// Polls the collection schema until `key` is available or the budget is spent.
///
/// The schema is read at least once, even with a zero timeout. Read errors
/// are treated like "not yet visible".
pub fn wait_for_attribute<B: DatabaseBackend + ?Sized>(
    backend: &B,
    collection: &CollectionId,
    key: &AttributeKey,
    policy: WaitPolicy,
) -> WaitRecord {
    let started = Instant::now();
    let mut polls = 0_u32;
    loop {
        polls = polls.saturating_add(1);
        match backend.get_collection(collection) {
            Ok(schema) if schema.is_visible(key) => {
                info!(collection = %collection, key = %key, polls, "attribute visible");
                return WaitRecord {
                    collection: collection.clone(),
                    key: key.clone(),
                    visible: true,
                    polls,
                };
            }
            Ok(_) => debug!(collection = %collection, key = %key, "attribute not visible yet"),
            Err(err) => debug!(collection = %collection, key = %key, error = %err, "schema poll failed"),
        }
        let elapsed = started.elapsed();
        if elapsed >= policy.timeout {
            break;
        }
        thread::sleep(policy.poll_interval.min(policy.timeout.saturating_sub(elapsed)));
    }
    warn!(
        collection = %collection,
        key = %key,
        timeout_ms = u64::try_from(policy.timeout.as_millis()).unwrap_or(u64::MAX),
        "attribute not visible before timeout; updates may fail temporarily"
    );
    WaitRecord {
        collection: collection.clone(),
        key: key.clone(),
        visible: false,
        polls,
    }
}
