//! Index store capability
//!
//! The engine talks to its backend only through these traits. The in-memory
//! [`MemoryIndex`](super::MemoryIndex) is one implementation; a remote
//! cluster client maps its transport failures to [`SearchError::Backend`].
//!
//! [`SearchError::Backend`]: crate::error::SearchError::Backend

use std::ops::Range;

use super::statistics::FieldStatistics;
use super::types::{DocId, Posting};
use super::writer::IndexBatch;
use crate::error::Result;
use crate::models::StoredDocument;

/// Read-only view of the index as of one commit
pub trait IndexReader {
    /// Postings of a term in a field, in ascending doc id order
    fn postings_for(&self, field: &str, term: &str) -> Vec<Posting>;

    fn stored(&self, doc_id: DocId) -> Option<StoredDocument>;

    /// Number of documents visible to this reader
    fn doc_count(&self) -> u64;

    fn field_statistics(&self, field: &str) -> FieldStatistics;

    /// Field length in tokens; 0 when the document lacks the field
    fn field_length(&self, field: &str, doc_id: DocId) -> u32;
}

/// A backend able to commit batches and hand out readers
pub trait IndexStore: Send + Sync {
    type Reader: IndexReader;

    /// Commit a batch atomically, returning the ids assigned to its documents
    fn write(&self, batch: IndexBatch) -> Result<Range<DocId>>;

    /// Snapshot of the last completed commit
    fn reader(&self) -> Result<Self::Reader>;

    /// Number of committed documents
    fn count(&self) -> Result<u64>;

    /// Release the backend; later calls fail with a backend error
    fn close(&self);
}
