// crates/schoolsphere-core/src/runtime/memory.rs
// ============================================================================
// Module: In-Memory Database
// Description: Deterministic DatabaseBackend for tests and local rehearsal.
// Purpose: Exercise the migration and backup jobs without a live BaaS.
// Dependencies: crate::{core, interfaces}, serde_json
// ============================================================================

//! ## Overview
//! [`InMemoryDatabase`] keeps collections, attributes, and documents behind a
//! shared mutex. It mirrors the BaaS behaviors the jobs depend on:
//! - creating an existing attribute returns [`BackendError::Conflict`],
//! - fresh attributes report `processing` for a configurable number of schema
//!   reads before turning `available`,
//! - updates touching an unknown or still-processing attribute are rejected.
//!
//! Fault hooks (unreachable server, failing documents, rejected attributes,
//! failing listings) and [`WriteCounters`] let tests assert exactly what a job
//! did. Clones share state.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use serde_json::Map;
use serde_json::Value;

use crate::core::AttributeInfo;
use crate::core::AttributeKey;
use crate::core::AttributeStatus;
use crate::core::CollectionId;
use crate::core::CollectionPage;
use crate::core::CollectionSchema;
use crate::core::CollectionSummary;
use crate::core::DatabaseId;
use crate::core::DatabaseInfo;
use crate::core::Document;
use crate::core::DocumentId;
use crate::core::DocumentPage;
use crate::core::PageRequest;
use crate::interfaces::BackendError;
use crate::interfaces::DatabaseBackend;

// ============================================================================
// SECTION: Counters
// ============================================================================

/// Calls observed by an [`InMemoryDatabase`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteCounters {
    /// Successful attribute creations.
    pub attribute_creates: u64,
    /// Successful document updates.
    pub document_updates: u64,
    /// Listing calls (documents and collections).
    pub list_calls: u64,
    /// Collection schema reads.
    pub schema_reads: u64,
}

impl WriteCounters {
    /// Returns the number of mutating calls that succeeded.
    #[must_use]
    pub const fn writes(&self) -> u64 {
        self.attribute_creates + self.document_updates
    }
}

// ============================================================================
// SECTION: State
// ============================================================================

/// Attribute as stored by the in-memory backend.
#[derive(Debug, Clone)]
struct StoredAttribute {
    key: AttributeKey,
    kind: String,
    /// Schema reads left before the attribute turns available.
    pending_reads: u32,
}

#[derive(Debug, Clone, Default)]
struct StoredCollection {
    name: Option<String>,
    attributes: Vec<StoredAttribute>,
    documents: Vec<Document>,
}

impl StoredCollection {
    fn attribute(&self, key: &str) -> Option<&StoredAttribute> {
        self.attributes.iter().find(|attribute| attribute.key.as_str() == key)
    }
}

#[derive(Debug)]
struct State {
    database: DatabaseId,
    collections: BTreeMap<CollectionId, StoredCollection>,
    counters: WriteCounters,
    visibility_lag: u32,
    failing_documents: BTreeSet<DocumentId>,
    rejected_attributes: BTreeSet<(CollectionId, AttributeKey)>,
    failing_listings: BTreeSet<CollectionId>,
    unreachable: bool,
    report_totals: bool,
}

// ============================================================================
// SECTION: Database
// ============================================================================

/// Shared in-memory document database.
#[derive(Debug, Clone)]
pub struct InMemoryDatabase {
    state: Arc<Mutex<State>>,
}

impl InMemoryDatabase {
    /// Creates an empty database.
    #[must_use]
    pub fn new(database: impl Into<DatabaseId>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                database: database.into(),
                collections: BTreeMap::new(),
                counters: WriteCounters::default(),
                visibility_lag: 0,
                failing_documents: BTreeSet::new(),
                rejected_attributes: BTreeSet::new(),
                failing_listings: BTreeSet::new(),
                unreachable: false,
                report_totals: true,
            })),
        }
    }

    /// Adds an empty collection.
    #[must_use]
    pub fn with_collection(self, collection: &str, name: &str) -> Self {
        self.inspect().collections.entry(CollectionId::new(collection)).or_default().name =
            Some(name.to_string());
        self
    }

    /// Adds an available attribute to a collection, creating it if needed.
    #[must_use]
    pub fn with_attribute(self, collection: &str, key: &str, kind: &str) -> Self {
        {
            let mut state = self.inspect();
            let stored = state.collections.entry(CollectionId::new(collection)).or_default();
            if stored.attribute(key).is_none() {
                stored.attributes.push(StoredAttribute {
                    key: AttributeKey::new(key),
                    kind: kind.to_string(),
                    pending_reads: 0,
                });
            }
        }
        self
    }

    /// Adds documents to a collection, creating it if needed.
    #[must_use]
    pub fn with_documents(self, collection: &str, documents: Vec<Document>) -> Self {
        self.inspect()
            .collections
            .entry(CollectionId::new(collection))
            .or_default()
            .documents
            .extend(documents);
        self
    }

    /// Sets how many schema reads a new attribute stays `processing`.
    pub fn set_visibility_lag(&self, reads: u32) {
        self.inspect().visibility_lag = reads;
    }

    /// Makes every update of the document fail.
    pub fn fail_updates_for(&self, document: &str) {
        self.inspect().failing_documents.insert(DocumentId::new(document));
    }

    /// Makes creation of an attribute fail with a non-conflict error.
    pub fn reject_attribute(&self, collection: &str, key: &str) {
        self.inspect()
            .rejected_attributes
            .insert((CollectionId::new(collection), AttributeKey::new(key)));
    }

    /// Makes document listing of a collection fail.
    pub fn fail_listing(&self, collection: &str) {
        self.inspect().failing_listings.insert(CollectionId::new(collection));
    }

    /// Makes every call fail as if the server were down.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.inspect().unreachable = unreachable;
    }

    /// Controls whether listing pages report a total.
    pub fn set_report_totals(&self, report_totals: bool) {
        self.inspect().report_totals = report_totals;
    }

    /// Returns the observed call counters.
    #[must_use]
    pub fn counters(&self) -> WriteCounters {
        self.inspect().counters
    }

    /// Returns a stored document.
    #[must_use]
    pub fn document(&self, collection: &str, document: &str) -> Option<Document> {
        self.inspect()
            .collections
            .get(&CollectionId::new(collection))
            .and_then(|stored| {
                stored.documents.iter().find(|doc| doc.id().as_str() == document).cloned()
            })
    }

    /// Returns every stored document of a collection.
    #[must_use]
    pub fn documents(&self, collection: &str) -> Vec<Document> {
        self.inspect()
            .collections
            .get(&CollectionId::new(collection))
            .map(|stored| stored.documents.clone())
            .unwrap_or_default()
    }

    /// Returns the attribute keys of a collection in creation order.
    #[must_use]
    pub fn attribute_keys(&self, collection: &str) -> Vec<String> {
        self.inspect()
            .collections
            .get(&CollectionId::new(collection))
            .map(|stored| {
                stored.attributes.iter().map(|attribute| attribute.key.as_str().to_string()).collect()
            })
            .unwrap_or_default()
    }

    /// Locks state for test setup and inspection, recovering from poison.
    fn inspect(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks state for a backend call.
    fn lock(&self) -> Result<MutexGuard<'_, State>, BackendError> {
        let state = self
            .state
            .lock()
            .map_err(|_| BackendError::Unavailable("in-memory state poisoned".to_string()))?;
        if state.unreachable {
            return Err(BackendError::Unavailable("connection refused".to_string()));
        }
        Ok(state)
    }
}

fn collection_not_found(collection: &CollectionId) -> BackendError {
    BackendError::NotFound(format!("collection {collection}"))
}

/// Converts a length or index into the page arithmetic domain.
fn to_u64(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

impl State {
    fn create_attribute(
        &mut self,
        collection: &CollectionId,
        key: &AttributeKey,
        kind: &str,
    ) -> Result<(), BackendError> {
        if self.rejected_attributes.contains(&(collection.clone(), key.clone())) {
            return Err(BackendError::Rejected {
                status: 400,
                message: format!("attribute {key} rejected"),
            });
        }
        let lag = self.visibility_lag;
        let stored =
            self.collections.get_mut(collection).ok_or_else(|| collection_not_found(collection))?;
        if stored.attribute(key.as_str()).is_some() {
            return Err(BackendError::Conflict(format!("attribute {key} already exists")));
        }
        stored.attributes.push(StoredAttribute {
            key: key.clone(),
            kind: kind.to_string(),
            pending_reads: lag,
        });
        self.counters.attribute_creates += 1;
        Ok(())
    }
}

impl DatabaseBackend for InMemoryDatabase {
    fn get_database(&self) -> Result<DatabaseInfo, BackendError> {
        let state = self.lock()?;
        Ok(DatabaseInfo {
            id: state.database.clone(),
            name: Some(state.database.as_str().to_string()),
        })
    }

    fn create_string_attribute(
        &self,
        collection: &CollectionId,
        key: &AttributeKey,
        _size: u32,
        _required: bool,
        _array: bool,
    ) -> Result<(), BackendError> {
        self.lock()?.create_attribute(collection, key, "string")
    }

    fn create_integer_attribute(
        &self,
        collection: &CollectionId,
        key: &AttributeKey,
        _required: bool,
        _min: Option<i64>,
        _max: Option<i64>,
        _array: bool,
    ) -> Result<(), BackendError> {
        self.lock()?.create_attribute(collection, key, "integer")
    }

    fn get_collection(&self, collection: &CollectionId) -> Result<CollectionSchema, BackendError> {
        let mut state = self.lock()?;
        state.counters.schema_reads += 1;
        let stored =
            state.collections.get_mut(collection).ok_or_else(|| collection_not_found(collection))?;
        let attributes = stored
            .attributes
            .iter_mut()
            .map(|attribute| {
                let status = if attribute.pending_reads == 0 {
                    AttributeStatus::Available
                } else {
                    attribute.pending_reads -= 1;
                    AttributeStatus::Processing
                };
                AttributeInfo {
                    key: attribute.key.clone(),
                    kind: Some(attribute.kind.clone()),
                    status: Some(status),
                }
            })
            .collect();
        Ok(CollectionSchema {
            id: collection.clone(),
            name: stored.name.clone(),
            attributes,
        })
    }

    fn list_documents(
        &self,
        collection: &CollectionId,
        page: PageRequest,
    ) -> Result<DocumentPage, BackendError> {
        let mut state = self.lock()?;
        state.counters.list_calls += 1;
        if state.failing_listings.contains(collection) {
            return Err(BackendError::Rejected {
                status: 500,
                message: format!("listing {collection} failed"),
            });
        }
        let report_totals = state.report_totals;
        let stored =
            state.collections.get(collection).ok_or_else(|| collection_not_found(collection))?;
        let documents: Vec<Document> = stored
            .documents
            .iter()
            .skip(usize::try_from(page.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit).unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok(DocumentPage {
            total: report_totals.then(|| to_u64(stored.documents.len())),
            documents,
        })
    }

    fn update_document(
        &self,
        collection: &CollectionId,
        document: &DocumentId,
        patch: &Map<String, Value>,
    ) -> Result<(), BackendError> {
        let mut state = self.lock()?;
        if state.failing_documents.contains(document) {
            return Err(BackendError::Rejected {
                status: 500,
                message: format!("update of {document} failed"),
            });
        }
        let stored =
            state.collections.get_mut(collection).ok_or_else(|| collection_not_found(collection))?;
        for key in patch.keys().filter(|key| !key.starts_with('$')) {
            match stored.attribute(key) {
                Some(attribute) if attribute.pending_reads == 0 => {}
                Some(_) => {
                    return Err(BackendError::Rejected {
                        status: 400,
                        message: format!("attribute {key} is still processing"),
                    });
                }
                None => {
                    return Err(BackendError::Rejected {
                        status: 400,
                        message: format!("unknown attribute: {key}"),
                    });
                }
            }
        }
        let target = stored
            .documents
            .iter_mut()
            .find(|doc| doc.id() == document)
            .ok_or_else(|| BackendError::NotFound(format!("document {document}")))?;
        target.apply_patch(patch);
        state.counters.document_updates += 1;
        Ok(())
    }

    fn list_collections(&self, page: PageRequest) -> Result<CollectionPage, BackendError> {
        let mut state = self.lock()?;
        state.counters.list_calls += 1;
        let total = to_u64(state.collections.len());
        let collections = state
            .collections
            .iter()
            .skip(usize::try_from(page.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit).unwrap_or(usize::MAX))
            .map(|(id, stored)| CollectionSummary {
                id: id.clone(),
                name: stored.name.clone(),
            })
            .collect();
        Ok(CollectionPage {
            total: state.report_totals.then_some(total),
            collections,
        })
    }
}
