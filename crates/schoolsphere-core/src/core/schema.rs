// crates/schoolsphere-core/src/core/schema.rs
// ============================================================================
// Module: SchoolSphere Attribute Schema
// Description: Attribute declarations, collection schemas, and migration plans.
// Purpose: Describe the optional fields the phase-1 migration provisions.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`MigrationPlan`] lists, per collection, the attributes to create and
//! the default value written to documents that lack them. The phase-1 plan
//! adds `assignedTo`/`mode` to `exams` and `subjects`/`timePerQuestion` to
//! `examAttempts`.
//!
//! ## Invariants
//! - Planned attributes are never required, so existing documents stay valid
//!   while the backfill is pending.
//! - Every planned field carries a non-null default.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::core::identifiers::AttributeKey;
use crate::core::identifiers::CollectionId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Collection holding exam definitions.
pub const EXAMS_COLLECTION: &str = "exams";
/// Collection holding student exam attempts.
pub const EXAM_ATTEMPTS_COLLECTION: &str = "examAttempts";

/// Size used for identifier and subject string arrays.
const LIST_ITEM_SIZE: u32 = 255;
/// Size used for the exam `mode` string.
const MODE_SIZE: u32 = 50;

// ============================================================================
// SECTION: Attribute Declarations
// ============================================================================

/// Attribute type and type-specific constraints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttributeKind {
    /// String attribute with a maximum size in characters.
    String {
        /// Maximum string length.
        size: u32,
    },
    /// Integer attribute with optional bounds.
    Integer {
        /// Inclusive lower bound.
        min: Option<i64>,
        /// Inclusive upper bound.
        max: Option<i64>,
    },
}

impl AttributeKind {
    /// Returns the BaaS type label for the attribute kind.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::String {
                ..
            } => "string",
            Self::Integer {
                ..
            } => "integer",
        }
    }
}

/// Declaration of a single collection attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSpec {
    /// Attribute key.
    pub key: AttributeKey,
    /// Attribute type and constraints.
    #[serde(flatten)]
    pub kind: AttributeKind,
    /// Whether documents must carry the attribute.
    pub required: bool,
    /// Whether the attribute holds an array of values.
    pub array: bool,
}

impl AttributeSpec {
    /// Declares an optional string attribute.
    #[must_use]
    pub fn optional_string(key: &str, size: u32, array: bool) -> Self {
        Self {
            key: AttributeKey::new(key),
            kind: AttributeKind::String {
                size,
            },
            required: false,
            array,
        }
    }

    /// Declares an optional scalar integer attribute.
    #[must_use]
    pub fn optional_integer(key: &str, min: Option<i64>, max: Option<i64>) -> Self {
        Self {
            key: AttributeKey::new(key),
            kind: AttributeKind::Integer {
                min,
                max,
            },
            required: false,
            array: false,
        }
    }
}

// ============================================================================
// SECTION: Collection Schema
// ============================================================================

/// Provisioning status reported for an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeStatus {
    /// Attribute is usable for reads and writes.
    Available,
    /// Attribute is still being created.
    Processing,
    /// Attribute is being removed.
    Deleting,
    /// Attribute creation stalled.
    Stuck,
    /// Attribute creation failed.
    Failed,
    /// Any status this toolkit does not know about.
    #[serde(other)]
    Unknown,
}

/// Attribute entry as listed by collection introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeInfo {
    /// Attribute key.
    pub key: AttributeKey,
    /// BaaS type label, when reported.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Provisioning status, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<AttributeStatus>,
}

impl AttributeInfo {
    /// Returns true when the attribute can be written.
    ///
    /// Backends that do not report a status are treated as immediately
    /// consistent.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self.status, None | Some(AttributeStatus::Available))
    }
}

/// Collection metadata returned by schema introspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionSchema {
    /// Collection identifier.
    #[serde(rename = "$id")]
    pub id: CollectionId,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Declared attributes.
    #[serde(default)]
    pub attributes: Vec<AttributeInfo>,
}

impl CollectionSchema {
    /// Looks up an attribute by key.
    #[must_use]
    pub fn attribute(&self, key: &AttributeKey) -> Option<&AttributeInfo> {
        self.attributes.iter().find(|attribute| &attribute.key == key)
    }

    /// Returns true when the attribute is listed and available for writes.
    #[must_use]
    pub fn is_visible(&self, key: &AttributeKey) -> bool {
        self.attribute(key).is_some_and(AttributeInfo::is_available)
    }
}

// ============================================================================
// SECTION: Exam Mode
// ============================================================================

/// Known values of the exam `mode` field.
///
/// Stored documents may carry other values; the migration never rewrites
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamMode {
    /// Graded exam (default for legacy documents).
    #[default]
    Exam,
    /// Ungraded practice session.
    Practice,
}

impl ExamMode {
    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exam => "exam",
            Self::Practice => "practice",
        }
    }
}

// ============================================================================
// SECTION: Migration Plan
// ============================================================================

/// An attribute to provision plus the default used for backfill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldPlan {
    /// Attribute declaration.
    pub spec: AttributeSpec,
    /// Default written to documents missing the field.
    pub default: Value,
}

/// Fields planned for a single collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionPlan {
    /// Target collection.
    pub collection: CollectionId,
    /// Planned fields in provisioning order.
    pub fields: Vec<FieldPlan>,
}

/// Ordered set of collection changes applied by one migration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationPlan {
    /// Human-readable plan name.
    pub name: String,
    /// Collections in processing order.
    pub collections: Vec<CollectionPlan>,
}

impl MigrationPlan {
    /// Returns the phase-1 plan for exams and exam attempts.
    #[must_use]
    pub fn phase1() -> Self {
        Self {
            name: "phase1".to_string(),
            collections: vec![
                CollectionPlan {
                    collection: CollectionId::new(EXAMS_COLLECTION),
                    fields: vec![
                        FieldPlan {
                            spec: AttributeSpec::optional_string("assignedTo", LIST_ITEM_SIZE, true),
                            default: json!([]),
                        },
                        FieldPlan {
                            spec: AttributeSpec::optional_string("mode", MODE_SIZE, false),
                            default: Value::String(ExamMode::default().as_str().to_string()),
                        },
                    ],
                },
                CollectionPlan {
                    collection: CollectionId::new(EXAM_ATTEMPTS_COLLECTION),
                    fields: vec![
                        FieldPlan {
                            spec: AttributeSpec::optional_string("subjects", LIST_ITEM_SIZE, true),
                            default: json!([]),
                        },
                        FieldPlan {
                            spec: AttributeSpec::optional_integer("timePerQuestion", Some(0), None),
                            default: json!(0),
                        },
                    ],
                },
            ],
        }
    }

    /// Returns the total number of planned attributes.
    #[must_use]
    pub fn attribute_count(&self) -> usize {
        self.collections.iter().map(|plan| plan.fields.len()).sum()
    }

    /// Looks up the plan for a collection.
    #[must_use]
    pub fn collection(&self, id: &CollectionId) -> Option<&CollectionPlan> {
        self.collections.iter().find(|plan| &plan.collection == id)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
