// crates/schoolsphere-core/src/core/documents.rs
// ============================================================================
// Module: SchoolSphere Documents
// Description: Document, page, and collection listing types.
// Purpose: Carry BaaS documents as raw JSON objects with a typed identifier.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Documents are stored as the JSON object the BaaS returned, including
//! system fields such as `$id` and `$createdAt`. The toolkit only reads and
//! patches individual fields, so no per-collection struct is modeled.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::core::identifiers::CollectionId;
use crate::core::identifiers::DatabaseId;
use crate::core::identifiers::DocumentId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// System field carrying the document identifier.
pub const DOCUMENT_ID_FIELD: &str = "$id";

// ============================================================================
// SECTION: Documents
// ============================================================================

/// A BaaS document.
///
/// # Invariants
/// - `fields[DOCUMENT_ID_FIELD]` always equals `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Document {
    /// Document identifier.
    id: DocumentId,
    /// All document fields, system fields included.
    fields: Map<String, Value>,
}

impl Document {
    /// Builds a document from an identifier and user fields.
    #[must_use]
    pub fn new(id: impl Into<DocumentId>, mut fields: Map<String, Value>) -> Self {
        let id = id.into();
        fields.insert(DOCUMENT_ID_FIELD.to_string(), Value::String(id.as_str().to_string()));
        Self {
            id,
            fields,
        }
    }

    /// Returns the document identifier.
    #[must_use]
    pub const fn id(&self) -> &DocumentId {
        &self.id
    }

    /// Returns all fields, system fields included.
    #[must_use]
    pub const fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Returns a field value.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Returns true when the field is absent or explicitly null.
    #[must_use]
    pub fn is_missing(&self, key: &str) -> bool {
        self.fields.get(key).is_none_or(Value::is_null)
    }

    /// Merges a partial update into the document. The identifier is immutable.
    pub fn apply_patch(&mut self, patch: &Map<String, Value>) {
        for (key, value) in patch {
            if key == DOCUMENT_ID_FIELD {
                continue;
            }
            self.fields.insert(key.clone(), value.clone());
        }
    }
}

impl TryFrom<Map<String, Value>> for Document {
    type Error = String;

    fn try_from(fields: Map<String, Value>) -> Result<Self, Self::Error> {
        let id = match fields.get(DOCUMENT_ID_FIELD) {
            Some(Value::String(id)) if !id.is_empty() => DocumentId::new(id.clone()),
            Some(_) => return Err("document $id must be a non-empty string".to_string()),
            None => return Err("document is missing $id".to_string()),
        };
        Ok(Self {
            id,
            fields,
        })
    }
}

impl From<Document> for Map<String, Value> {
    fn from(document: Document) -> Self {
        document.fields
    }
}

// ============================================================================
// SECTION: Pagination
// ============================================================================

/// Limit/offset page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Maximum number of items to return.
    pub limit: u32,
    /// Number of items to skip.
    pub offset: u64,
}

/// A page of documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentPage {
    /// Total number of documents in the collection, when reported.
    #[serde(default)]
    pub total: Option<u64>,
    /// Documents in this page.
    #[serde(default)]
    pub documents: Vec<Document>,
}

/// Collection entry returned by collection listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSummary {
    /// Collection identifier.
    #[serde(rename = "$id")]
    pub id: CollectionId,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A page of collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionPage {
    /// Total number of collections, when reported.
    #[serde(default)]
    pub total: Option<u64>,
    /// Collections in this page.
    #[serde(default)]
    pub collections: Vec<CollectionSummary>,
}

/// Database metadata returned by the connectivity check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    /// Database identifier.
    #[serde(rename = "$id")]
    pub id: DatabaseId,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, reason = "Test assertions.")]

    use serde_json::json;

    use super::*;

    #[test]
    fn document_requires_string_id() {
        let missing: Result<Document, _> = serde_json::from_value(json!({"title": "Algebra"}));
        assert!(missing.is_err());
        let numeric: Result<Document, _> = serde_json::from_value(json!({"$id": 7}));
        assert!(numeric.is_err());
    }

    #[test]
    fn null_fields_count_as_missing() {
        let document: Document =
            serde_json::from_value(json!({"$id": "e1", "mode": null, "assignedTo": []})).unwrap();
        assert!(document.is_missing("mode"));
        assert!(document.is_missing("timePerQuestion"));
        assert!(!document.is_missing("assignedTo"));
    }

    #[test]
    fn patch_cannot_change_identifier() {
        let mut document = Document::new("e1", Map::new());
        let mut patch = Map::new();
        patch.insert("$id".to_string(), json!("other"));
        patch.insert("mode".to_string(), json!("exam"));
        document.apply_patch(&patch);
        assert_eq!(document.id().as_str(), "e1");
        assert_eq!(document.field("$id"), Some(&json!("e1")));
        assert_eq!(document.field("mode"), Some(&json!("exam")));
    }
}
