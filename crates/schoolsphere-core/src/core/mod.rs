// crates/schoolsphere-core/src/core/mod.rs
// ============================================================================
// Module: SchoolSphere Core Types
// Description: Identifiers, attribute schema, and document types.
// Purpose: Provide stable, serializable types shared by every crate.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Core types describe BaaS collections and documents as this toolkit sees
//! them. Documents are kept as raw JSON objects; only the fields the
//! migration manages are given names.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod documents;
pub mod identifiers;
pub mod schema;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use documents::CollectionPage;
pub use documents::CollectionSummary;
pub use documents::DatabaseInfo;
pub use documents::Document;
pub use documents::DocumentPage;
pub use documents::PageRequest;
pub use identifiers::AttributeKey;
pub use identifiers::CollectionId;
pub use identifiers::DatabaseId;
pub use identifiers::DocumentId;
pub use schema::AttributeInfo;
pub use schema::AttributeKind;
pub use schema::AttributeSpec;
pub use schema::AttributeStatus;
pub use schema::CollectionPlan;
pub use schema::CollectionSchema;
pub use schema::EXAM_ATTEMPTS_COLLECTION;
pub use schema::EXAMS_COLLECTION;
pub use schema::ExamMode;
pub use schema::FieldPlan;
pub use schema::MigrationPlan;
