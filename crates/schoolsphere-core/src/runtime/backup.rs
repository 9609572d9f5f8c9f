// crates/schoolsphere-core/src/runtime/backup.rs
// ============================================================================
// Module: Database Backup Export
// Description: Read-only JSON export of every collection in the database.
// Purpose: Snapshot production data before running a migration.
// Dependencies: crate::{core, interfaces, runtime::pagination}, serde_json, time
// ============================================================================

//! ## Overview
//! The export enumerates all collections with paginated listing, reads every
//! document of each, and writes:
//!
//! ```text
//! <out>/<timestamp>/database/<collectionId>.json
//! <out>/<timestamp>/metadata.json
//! ```
//!
//! The timestamp is RFC 3339 UTC with `:` replaced by `-` so the directory
//! name is portable. The export never writes to the backend.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::info;

use crate::core::CollectionId;
use crate::core::DatabaseId;
use crate::core::Document;
use crate::interfaces::BackendError;
use crate::interfaces::DatabaseBackend;
use crate::runtime::pagination::DEFAULT_PAGE_DELAY;
use crate::runtime::pagination::DEFAULT_PAGE_SIZE;
use crate::runtime::pagination::list_all_collections;
use crate::runtime::pagination::list_all_documents;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Subdirectory holding one file per collection.
const DATABASE_DIR: &str = "database";
/// Manifest file name.
const METADATA_FILE: &str = "metadata.json";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Backup export options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupOptions {
    /// Root directory; a timestamped subdirectory is created inside it.
    pub out_dir: PathBuf,
    /// Listing page size.
    pub page_size: u32,
    /// Delay between listing pages.
    pub page_delay: Duration,
    /// BaaS endpoint recorded in the manifest.
    pub endpoint: String,
    /// Project identifier recorded in the manifest.
    pub project_id: String,
}

impl BackupOptions {
    /// Creates options with default paging.
    #[must_use]
    pub fn new(out_dir: impl Into<PathBuf>, endpoint: &str, project_id: &str) -> Self {
        Self {
            out_dir: out_dir.into(),
            page_size: DEFAULT_PAGE_SIZE,
            page_delay: DEFAULT_PAGE_DELAY,
            endpoint: endpoint.to_string(),
            project_id: project_id.to_string(),
        }
    }
}

/// Manifest entry for one exported collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionBackup {
    /// Collection identifier.
    pub id: CollectionId,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Number of documents exported.
    pub count: u64,
}

/// Contents of `metadata.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupManifest {
    /// Export start time (RFC 3339).
    pub created_at: String,
    /// BaaS endpoint.
    pub endpoint: String,
    /// Project identifier.
    pub project_id: String,
    /// Database identifier.
    pub database_id: DatabaseId,
    /// Exported collections in listing order.
    pub collections: Vec<CollectionBackup>,
    /// Directory the export was written to.
    #[serde(skip)]
    pub directory: PathBuf,
}

/// Contents of `database/<collectionId>.json`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CollectionFile<'a> {
    collection_id: &'a CollectionId,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    documents: &'a [Document],
}

/// Backup export errors.
#[derive(Debug, Error)]
pub enum BackupError {
    /// A backend call failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
    /// Writing the export failed.
    #[error("backup io error at {path}: {message}")]
    Io {
        /// Path being written.
        path: PathBuf,
        /// I/O error message.
        message: String,
    },
    /// JSON encoding failed.
    #[error("backup serialization error: {0}")]
    Serialize(String),
    /// The export timestamp could not be formatted.
    #[error("backup timestamp error: {0}")]
    Clock(String),
}

// ============================================================================
// SECTION: Export
// ============================================================================

/// Exports every collection using the current UTC time as timestamp.
///
/// # Errors
///
/// Returns [`BackupError`] when a listing call or a file write fails.
pub fn export_database<B: DatabaseBackend + ?Sized>(
    backend: &B,
    options: &BackupOptions,
) -> Result<BackupManifest, BackupError> {
    export_database_at(backend, options, OffsetDateTime::now_utc())
}

/// Exports every collection using `created_at` as timestamp.
///
/// # Errors
///
/// Returns [`BackupError`] when a listing call or a file write fails.
pub fn export_database_at<B: DatabaseBackend + ?Sized>(
    backend: &B,
    options: &BackupOptions,
    created_at: OffsetDateTime,
) -> Result<BackupManifest, BackupError> {
    let created_at =
        created_at.format(&Rfc3339).map_err(|err| BackupError::Clock(err.to_string()))?;
    let directory = options.out_dir.join(created_at.replace(':', "-"));
    let database = backend.get_database()?;
    let database_dir = directory.join(DATABASE_DIR);
    fs::create_dir_all(&database_dir).map_err(|err| io_error(&database_dir, &err))?;

    info!(database = %database.id, directory = %directory.display(), "enumerating collections");
    let collections = list_all_collections(backend, options.page_size, options.page_delay)?;

    let mut entries = Vec::with_capacity(collections.len());
    for collection in &collections {
        info!(collection = %collection.id, name = collection.name.as_deref().unwrap_or(""), "backing up collection");
        let documents =
            list_all_documents(backend, &collection.id, options.page_size, options.page_delay)?;
        let file = CollectionFile {
            collection_id: &collection.id,
            name: collection.name.as_deref(),
            documents: &documents,
        };
        write_json(&database_dir.join(format!("{}.json", collection.id)), &file)?;
        entries.push(CollectionBackup {
            id: collection.id.clone(),
            name: collection.name.clone(),
            count: u64::try_from(documents.len()).unwrap_or(u64::MAX),
        });
    }

    let manifest = BackupManifest {
        created_at,
        endpoint: options.endpoint.clone(),
        project_id: options.project_id.clone(),
        database_id: database.id,
        collections: entries,
        directory,
    };
    write_json(&manifest.directory.join(METADATA_FILE), &manifest)?;
    info!(directory = %manifest.directory.display(), collections = manifest.collections.len(), "backup completed");
    Ok(manifest)
}

/// Reads a collection file written by an export and returns its documents.
///
/// # Errors
///
/// Returns [`BackupError`] when the file cannot be read or parsed.
pub fn read_collection_backup(path: &Path) -> Result<Vec<Document>, BackupError> {
    let bytes = fs::read(path).map_err(|err| io_error(path, &err))?;
    let mut value: Value =
        serde_json::from_slice(&bytes).map_err(|err| BackupError::Serialize(err.to_string()))?;
    let documents = value.get_mut("documents").map(Value::take).unwrap_or(Value::Array(Vec::new()));
    serde_json::from_value(documents).map_err(|err| BackupError::Serialize(err.to_string()))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), BackupError> {
    let bytes =
        serde_json::to_vec_pretty(value).map_err(|err| BackupError::Serialize(err.to_string()))?;
    fs::write(path, bytes).map_err(|err| io_error(path, &err))
}

fn io_error(path: &Path, err: &std::io::Error) -> BackupError {
    BackupError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}
