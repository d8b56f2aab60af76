//! Immutable in-memory segments
//!
//! Every committed batch becomes one segment covering a contiguous range of
//! document ids. Segments are never modified after they are built.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::ops::Range;

use super::statistics::FieldStatistics;
use super::types::{DocId, Posting, SegmentId};
use super::writer::IndexBatch;

/// Metadata for a committed segment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentMeta {
    pub id: SegmentId,
    /// First document id in this segment
    pub base_doc_id: DocId,
    pub doc_count: u64,
}

impl SegmentMeta {
    pub fn doc_ids(&self) -> Range<DocId> {
        self.base_doc_id..self.base_doc_id + self.doc_count
    }
}

#[derive(Debug, Default)]
struct FieldPostings {
    terms: HashMap<String, Vec<Posting>>,
    /// Field length per document, indexed by offset from the segment base
    lengths: Vec<u32>,
    stats: FieldStatistics,
}

/// Immutable postings and stored records of one committed batch
#[derive(Debug)]
pub struct Segment {
    meta: SegmentMeta,
    fields: HashMap<String, FieldPostings>,
    stored: Vec<Map<String, Value>>,
}

impl Segment {
    /// Build a segment, numbering documents from `base_doc_id` in batch order
    pub fn build(id: SegmentId, base_doc_id: DocId, batch: IndexBatch) -> Self {
        let documents = batch.into_documents();
        let doc_count = documents.len();
        let mut fields: HashMap<String, FieldPostings> = HashMap::new();
        let mut stored = Vec::with_capacity(doc_count);

        for (offset, doc) in documents.into_iter().enumerate() {
            let doc_id = base_doc_id + offset as DocId;

            for (name, field) in doc.fields {
                let postings = fields.entry(name).or_default();
                if postings.lengths.len() < doc_count {
                    postings.lengths.resize(doc_count, 0);
                }
                postings.lengths[offset] = field.length;
                postings.stats.add_document(field.length);

                for (term, occurrences) in field.terms {
                    postings.terms.entry(term).or_default().push(Posting::new(
                        doc_id,
                        occurrences.frequency,
                        occurrences.positions,
                    ));
                }
            }

            stored.push(doc.stored);
        }

        Self {
            meta: SegmentMeta {
                id,
                base_doc_id,
                doc_count: doc_count as u64,
            },
            fields,
            stored,
        }
    }

    pub fn meta(&self) -> &SegmentMeta {
        &self.meta
    }

    pub fn id(&self) -> SegmentId {
        self.meta.id
    }

    pub fn doc_count(&self) -> u64 {
        self.meta.doc_count
    }

    pub fn contains(&self, doc_id: DocId) -> bool {
        self.meta.doc_ids().contains(&doc_id)
    }

    /// Posting list of a term in a field, in ascending doc id order
    pub fn postings(&self, field: &str, term: &str) -> &[Posting] {
        self.fields
            .get(field)
            .and_then(|f| f.terms.get(term))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn stored(&self, doc_id: DocId) -> Option<&Map<String, Value>> {
        let offset = doc_id.checked_sub(self.meta.base_doc_id)?;
        self.stored.get(offset as usize)
    }

    /// Field length in tokens; 0 when the document lacks the field
    pub fn field_length(&self, field: &str, doc_id: DocId) -> u32 {
        let Some(offset) = doc_id.checked_sub(self.meta.base_doc_id) else {
            return 0;
        };
        self.fields
            .get(field)
            .and_then(|f| f.lengths.get(offset as usize))
            .copied()
            .unwrap_or(0)
    }

    pub fn field_statistics(&self) -> impl Iterator<Item = (&str, &FieldStatistics)> {
        self.fields
            .iter()
            .map(|(name, field)| (name.as_str(), &field.stats))
    }
}
