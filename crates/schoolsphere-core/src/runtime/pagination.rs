// crates/schoolsphere-core/src/runtime/pagination.rs
// ============================================================================
// Module: Limit/Offset Pagination
// Description: Exhaustive enumeration of documents and collections.
// Purpose: Read whole collections in fixed-size pages without gaps or repeats.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! The BaaS exposes limit/offset listing. Enumeration advances the offset by
//! the number of items actually returned and stops on the first of:
//! - an empty page,
//! - a page shorter than the requested limit,
//! - the offset reaching the total reported by the first page.
//!
//! An optional delay between pages keeps long scans under free-tier rate
//! limits.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::thread;
use std::time::Duration;

use crate::core::CollectionId;
use crate::core::CollectionSummary;
use crate::core::Document;
use crate::core::PageRequest;
use crate::interfaces::BackendError;
use crate::interfaces::DatabaseBackend;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default page size for listing calls.
pub const DEFAULT_PAGE_SIZE: u32 = 100;
/// Default delay between consecutive page reads.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(20);

// ============================================================================
// SECTION: Cursor
// ============================================================================

/// Offset bookkeeping shared by every listing loop.
#[derive(Debug, Clone)]
struct PageCursor {
    /// Requested page size (at least 1).
    limit: u32,
    /// Offset of the next page.
    offset: u64,
    /// Total reported by the first page.
    total: Option<u64>,
    /// Set once a termination condition was met.
    done: bool,
}

impl PageCursor {
    /// Creates a cursor at offset zero.
    fn new(limit: u32) -> Self {
        Self {
            limit: limit.max(1),
            offset: 0,
            total: None,
            done: false,
        }
    }

    /// Returns the request for the next page.
    const fn request(&self) -> PageRequest {
        PageRequest {
            limit: self.limit,
            offset: self.offset,
        }
    }

    /// Records a fetched page and evaluates the termination conditions.
    fn advance(&mut self, returned: usize, reported_total: Option<u64>) {
        if self.total.is_none() {
            self.total = reported_total;
        }
        let returned = u64::try_from(returned).unwrap_or(u64::MAX);
        self.offset = self.offset.saturating_add(returned);
        let short_page = returned < u64::from(self.limit);
        let total_reached = self.total.is_some_and(|total| self.offset >= total);
        if returned == 0 || short_page || total_reached {
            self.done = true;
        }
    }
}

// ============================================================================
// SECTION: Document Pager
// ============================================================================

/// Iterator over the pages of a collection's documents.
///
/// Yields non-empty pages only. After an error the iterator is exhausted.
pub struct DocumentPager<'a, B: DatabaseBackend + ?Sized> {
    /// Backend to read from.
    backend: &'a B,
    /// Collection being enumerated.
    collection: &'a CollectionId,
    /// Delay inserted before every page after the first.
    page_delay: Duration,
    /// Offset bookkeeping.
    cursor: PageCursor,
    /// Number of pages requested so far.
    requests: u64,
}

impl<'a, B: DatabaseBackend + ?Sized> DocumentPager<'a, B> {
    /// Creates a pager starting at offset zero.
    #[must_use]
    pub fn new(
        backend: &'a B,
        collection: &'a CollectionId,
        page_size: u32,
        page_delay: Duration,
    ) -> Self {
        Self {
            backend,
            collection,
            page_delay,
            cursor: PageCursor::new(page_size),
            requests: 0,
        }
    }

    /// Returns the total reported by the backend, once known.
    #[must_use]
    pub const fn reported_total(&self) -> Option<u64> {
        self.cursor.total
    }

    /// Returns the number of page requests issued.
    #[must_use]
    pub const fn requests(&self) -> u64 {
        self.requests
    }
}

impl<B: DatabaseBackend + ?Sized> Iterator for DocumentPager<'_, B> {
    type Item = Result<Vec<Document>, BackendError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor.done {
            return None;
        }
        if self.requests > 0 && !self.page_delay.is_zero() {
            thread::sleep(self.page_delay);
        }
        self.requests = self.requests.saturating_add(1);
        match self.backend.list_documents(self.collection, self.cursor.request()) {
            Ok(page) => {
                self.cursor.advance(page.documents.len(), page.total);
                if page.documents.is_empty() { None } else { Some(Ok(page.documents)) }
            }
            Err(err) => {
                self.cursor.done = true;
                Some(Err(err))
            }
        }
    }
}

// ============================================================================
// SECTION: Collectors
// ============================================================================

/// Reads every document of a collection.
///
/// # Errors
///
/// Returns [`BackendError`] when any page read fails.
pub fn list_all_documents<B: DatabaseBackend + ?Sized>(
    backend: &B,
    collection: &CollectionId,
    page_size: u32,
    page_delay: Duration,
) -> Result<Vec<Document>, BackendError> {
    let mut documents = Vec::new();
    for page in DocumentPager::new(backend, collection, page_size, page_delay) {
        documents.extend(page?);
    }
    Ok(documents)
}

/// Reads every collection of the configured database.
///
/// # Errors
///
/// Returns [`BackendError`] when any page read fails.
pub fn list_all_collections<B: DatabaseBackend + ?Sized>(
    backend: &B,
    page_size: u32,
    page_delay: Duration,
) -> Result<Vec<CollectionSummary>, BackendError> {
    let mut cursor = PageCursor::new(page_size);
    let mut collections = Vec::new();
    while !cursor.done {
        if !collections.is_empty() && !page_delay.is_zero() {
            thread::sleep(page_delay);
        }
        let page = backend.list_collections(cursor.request())?;
        cursor.advance(page.collections.len(), page.total);
        collections.extend(page.collections);
    }
    Ok(collections)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
