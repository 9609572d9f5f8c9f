// crates/schoolsphere-core/src/interfaces/mod.rs
// ============================================================================
// Module: SchoolSphere Interfaces
// Description: Backend-agnostic interface to the BaaS document database.
// Purpose: Define the contract surface used by the migration and backup jobs.
// Dependencies: crate::core, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`DatabaseBackend`] is the seam between the batch jobs and a concrete BaaS
//! client. Each method maps to exactly one BaaS operation and is scoped to a
//! single configured database. Implementations are synchronous; callers run
//! them sequentially and assume they are the only writer.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::core::AttributeKey;
use crate::core::CollectionId;
use crate::core::CollectionPage;
use crate::core::CollectionSchema;
use crate::core::DatabaseInfo;
use crate::core::DocumentId;
use crate::core::DocumentPage;
use crate::core::PageRequest;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors reported by database backends.
///
/// # Invariants
/// - Variants are stable for error classification; [`BackendError::Conflict`]
///   is the only variant callers treat as benign.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The resource already exists (HTTP 409).
    #[error("already exists: {0}")]
    Conflict(String),
    /// The resource does not exist (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),
    /// Credentials were rejected (HTTP 401/403).
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    /// The request was rejected with another status.
    #[error("request rejected with status {status}: {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Backend-provided message.
        message: String,
    },
    /// The backend could not be reached.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
    /// The backend answered with an unexpected payload.
    #[error("invalid backend response: {0}")]
    InvalidResponse(String),
}

impl BackendError {
    /// Returns true when the error means "already exists".
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

// ============================================================================
// SECTION: Database Backend
// ============================================================================

/// Document database operations consumed from the BaaS.
pub trait DatabaseBackend {
    /// Fetches the configured database; used as the connectivity check.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the database cannot be read.
    fn get_database(&self) -> Result<DatabaseInfo, BackendError>;

    /// Creates a string attribute on a collection.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Conflict`] when the attribute already exists and
    /// another [`BackendError`] for any other failure.
    fn create_string_attribute(
        &self,
        collection: &CollectionId,
        key: &AttributeKey,
        size: u32,
        required: bool,
        array: bool,
    ) -> Result<(), BackendError>;

    /// Creates an integer attribute on a collection.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Conflict`] when the attribute already exists and
    /// another [`BackendError`] for any other failure.
    fn create_integer_attribute(
        &self,
        collection: &CollectionId,
        key: &AttributeKey,
        required: bool,
        min: Option<i64>,
        max: Option<i64>,
        array: bool,
    ) -> Result<(), BackendError>;

    /// Reads a collection schema.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the collection cannot be read.
    fn get_collection(&self, collection: &CollectionId) -> Result<CollectionSchema, BackendError>;

    /// Lists one page of documents.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the page cannot be read.
    fn list_documents(
        &self,
        collection: &CollectionId,
        page: PageRequest,
    ) -> Result<DocumentPage, BackendError>;

    /// Applies a partial update to a document.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the update is rejected.
    fn update_document(
        &self,
        collection: &CollectionId,
        document: &DocumentId,
        patch: &Map<String, Value>,
    ) -> Result<(), BackendError>;

    /// Lists one page of collections in the database.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] when the page cannot be read.
    fn list_collections(&self, page: PageRequest) -> Result<CollectionPage, BackendError>;
}

impl<T: DatabaseBackend + ?Sized> DatabaseBackend for &T {
    fn get_database(&self) -> Result<DatabaseInfo, BackendError> {
        (**self).get_database()
    }

    fn create_string_attribute(
        &self,
        collection: &CollectionId,
        key: &AttributeKey,
        size: u32,
        required: bool,
        array: bool,
    ) -> Result<(), BackendError> {
        (**self).create_string_attribute(collection, key, size, required, array)
    }

    fn create_integer_attribute(
        &self,
        collection: &CollectionId,
        key: &AttributeKey,
        required: bool,
        min: Option<i64>,
        max: Option<i64>,
        array: bool,
    ) -> Result<(), BackendError> {
        (**self).create_integer_attribute(collection, key, required, min, max, array)
    }

    fn get_collection(&self, collection: &CollectionId) -> Result<CollectionSchema, BackendError> {
        (**self).get_collection(collection)
    }

    fn list_documents(
        &self,
        collection: &CollectionId,
        page: PageRequest,
    ) -> Result<DocumentPage, BackendError> {
        (**self).list_documents(collection, page)
    }

    fn update_document(
        &self,
        collection: &CollectionId,
        document: &DocumentId,
        patch: &Map<String, Value>,
    ) -> Result<(), BackendError> {
        (**self).update_document(collection, document, patch)
    }

    fn list_collections(&self, page: PageRequest) -> Result<CollectionPage, BackendError> {
        (**self).list_collections(page)
    }
}
