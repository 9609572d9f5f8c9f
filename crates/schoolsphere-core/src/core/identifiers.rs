// crates/schoolsphere-core/src/core/identifiers.rs
// ============================================================================
// Module: SchoolSphere Identifiers
// Description: Opaque identifiers for BaaS databases, collections, and documents.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Identifiers are opaque strings assigned by the BaaS. They serialize
//! transparently so JSON payloads keep their native shape. Validation of the
//! values themselves is left to the backend.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Generates the shared newtype surface for a string identifier.
macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier.
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

string_identifier!(
    /// Database identifier within a BaaS project.
    DatabaseId
);

string_identifier!(
    /// Collection identifier within a database.
    CollectionId
);

string_identifier!(
    /// Document identifier (the `$id` system field).
    DocumentId
);

string_identifier!(
    /// Attribute (field) key within a collection schema.
    AttributeKey
);
