//! In-memory index store
//!
//! MemoryIndex = immutable segments published through an `ArcSwap` snapshot.
//! Writers are serialized by a mutex; readers never block.

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use super::reader::Segment;
use super::statistics::FieldStatistics;
use super::store::{IndexReader, IndexStore};
use super::types::{DocId, Posting, SegmentId};
use super::writer::IndexBatch;
use crate::error::{Result, SearchError};
use crate::models::StoredDocument;

/// State visible to readers after a commit
#[derive(Debug, Default)]
struct IndexSnapshot {
    /// Segments ordered by base doc id
    segments: Vec<Arc<Segment>>,
    doc_count: u64,
    statistics: HashMap<String, FieldStatistics>,
    next_segment_id: SegmentId,
}

impl IndexSnapshot {
    fn with_segment(&self, segment: Arc<Segment>) -> Self {
        let mut statistics = self.statistics.clone();
        for (field, stats) in segment.field_statistics() {
            statistics.entry(field.to_string()).or_default().merge(stats);
        }

        let mut segments = self.segments.clone();
        let doc_count = self.doc_count + segment.doc_count();
        let next_segment_id = segment.id().next();
        segments.push(segment);

        Self {
            segments,
            doc_count,
            statistics,
            next_segment_id,
        }
    }

    fn segment_for(&self, doc_id: DocId) -> Option<&Arc<Segment>> {
        let idx = self
            .segments
            .partition_point(|s| s.meta().base_doc_id <= doc_id);
        let segment = self.segments.get(idx.checked_sub(1)?)?;
        segment.contains(doc_id).then_some(segment)
    }
}

/// Embedded in-memory index store
pub struct MemoryIndex {
    snapshot: ArcSwap<IndexSnapshot>,
    write_lock: Mutex<()>,
    closed: AtomicBool,
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.snapshot.load();
        f.debug_struct("MemoryIndex")
            .field("segments", &self.segment_count())
            .field("doc_count", &snapshot.doc_count)
            .field("closed", &self.closed.load(Ordering::Acquire))
            .finish()
    }
}

impl MemoryIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(IndexSnapshot::default()),
            write_lock: Mutex::new(()),
            closed: AtomicBool::new(false),
        }
    }

    /// Number of committed segments
    pub fn segment_count(&self) -> usize {
        self.snapshot.load().segments.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return Err(SearchError::Backend("index store is closed".to_string()));
        }
        Ok(())
    }
}

impl IndexStore for MemoryIndex {
    type Reader = MemoryReader;

    fn write(&self, batch: IndexBatch) -> Result<Range<DocId>> {
        let _guard = self.write_lock.lock();
        self.ensure_open()?;

        let current = self.snapshot.load_full();
        let base = current.doc_count;
        if batch.is_empty() {
            return Ok(base..base);
        }

        let segment = Arc::new(Segment::build(current.next_segment_id, base, batch));
        let ids = segment.meta().doc_ids();
        let segment_id = segment.id();

        let next = current.with_segment(segment);
        let total = next.doc_count;
        self.snapshot.store(Arc::new(next));

        info!(
            segment = %segment_id,
            documents = ids.end - ids.start,
            total,
            "Committed batch"
        );
        Ok(ids)
    }

    fn reader(&self) -> Result<MemoryReader> {
        self.ensure_open()?;
        Ok(MemoryReader {
            snapshot: self.snapshot.load_full(),
        })
    }

    fn count(&self) -> Result<u64> {
        self.ensure_open()?;
        Ok(self.snapshot.load().doc_count)
    }

    fn close(&self) {
        let _guard = self.write_lock.lock();
        if !self.closed.swap(true, Ordering::AcqRel) {
            self.snapshot.store(Arc::new(IndexSnapshot::default()));
            debug!("Closed in-memory index");
        }
    }
}

/// Reader over one committed snapshot of a [`MemoryIndex`]
#[derive(Clone, Debug)]
pub struct MemoryReader {
    snapshot: Arc<IndexSnapshot>,
}

impl IndexReader for MemoryReader {
    fn postings_for(&self, field: &str, term: &str) -> Vec<Posting> {
        self.snapshot
            .segments
            .iter()
            .flat_map(|segment| segment.postings(field, term).iter().cloned())
            .collect()
    }

    fn stored(&self, doc_id: DocId) -> Option<StoredDocument> {
        let segment = self.snapshot.segment_for(doc_id)?;
        segment
            .stored(doc_id)
            .map(|fields| StoredDocument::new(doc_id, fields.clone()))
    }

    fn doc_count(&self) -> u64 {
        self.snapshot.doc_count
    }

    fn field_statistics(&self, field: &str) -> FieldStatistics {
        self.snapshot
            .statistics
            .get(field)
            .copied()
            .unwrap_or_default()
    }

    fn field_length(&self, field: &str, doc_id: DocId) -> u32 {
        self.snapshot
            .segment_for(doc_id)
            .map(|segment| segment.field_length(field, doc_id))
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Document;
    use crate::schema::{FieldOptions, Schema};
    use crate::segment::IndexWriter;

    fn writer() -> IndexWriter {
        let schema = Schema::builder()
            .field("title", FieldOptions::text().stored())
            .field("content", FieldOptions::text())
            .build()
            .unwrap();
        IndexWriter::new(Arc::new(schema))
    }

    fn titles(titles: &[&str]) -> IndexBatch {
        writer()
            .prepare(titles.iter().map(|t| Document::new().with("title", *t)))
            .unwrap()
    }

    #[test]
    fn test_sequential_doc_ids() {
        let index = MemoryIndex::new();
        assert_eq!(index.write(titles(&["wing", "airfoil"])).unwrap(), 0..2);
        assert_eq!(index.write(titles(&["shock"])).unwrap(), 2..3);
        assert_eq!(index.count().unwrap(), 3);
        assert_eq!(index.segment_count(), 2);
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let index = MemoryIndex::new();
        index.write(titles(&["wing"])).unwrap();
        assert_eq!(index.write(IndexBatch::default()).unwrap(), 1..1);
        assert_eq!(index.segment_count(), 1);
    }

    #[test]
    fn test_postings_across_segments() {
        let index = MemoryIndex::new();
        index.write(titles(&["supersonic wing", "airfoil"])).unwrap();
        index.write(titles(&["swept wing"])).unwrap();

        let reader = index.reader().unwrap();
        let doc_ids: Vec<DocId> = reader
            .postings_for("title", "wing")
            .iter()
            .map(|p| p.doc_id)
            .collect();
        assert_eq!(doc_ids, vec![0, 2]);
        assert!(reader.postings_for("content", "wing").is_empty());
    }

    #[test]
    fn test_statistics_merge() {
        let index = MemoryIndex::new();
        index.write(titles(&["supersonic wing"])).unwrap();
        index.write(titles(&["wing"])).unwrap();

        let reader = index.reader().unwrap();
        let stats = reader.field_statistics("title");
        assert_eq!(stats.doc_count, 2);
        assert_eq!(stats.total_length, 3);
        assert_eq!(reader.field_length("title", 0), 2);
        assert_eq!(reader.field_length("title", 1), 1);
        assert_eq!(reader.field_length("title", 9), 0);
        assert_eq!(reader.field_statistics("content"), FieldStatistics::default());
    }

    #[test]
    fn test_stored_lookup() {
        let index = MemoryIndex::new();
        index.write(titles(&["wing"])).unwrap();
        index.write(titles(&["shock", "airfoil"])).unwrap();

        let reader = index.reader().unwrap();
        let stored = reader.stored(2).unwrap();
        assert_eq!(stored.doc_id, 2);
        assert_eq!(stored.get("title").unwrap(), "airfoil");
        assert_eq!(stored.raw_document().unwrap().get_str("title"), Some("airfoil"));
        assert!(reader.stored(3).is_none());
    }

    #[test]
    fn test_reader_is_a_snapshot() {
        let index = MemoryIndex::new();
        index.write(titles(&["wing"])).unwrap();

        let reader = index.reader().unwrap();
        index.write(titles(&["wing"])).unwrap();

        assert_eq!(reader.doc_count(), 1);
        assert_eq!(reader.postings_for("title", "wing").len(), 1);
        assert_eq!(index.reader().unwrap().doc_count(), 2);
    }

    #[test]
    fn test_closed_store() {
        let index = MemoryIndex::new();
        index.write(titles(&["wing"])).unwrap();
        index.close();

        assert!(index.is_closed());
        assert!(matches!(index.count(), Err(SearchError::Backend(_))));
        assert!(matches!(index.reader(), Err(SearchError::Backend(_))));
        assert!(matches!(
            index.write(titles(&["wing"])),
            Err(SearchError::Backend(_))
        ));
        // Closing twice is harmless
        index.close();
    }
}
