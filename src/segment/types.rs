//! Core types for the segment-based index

use serde::{Deserialize, Serialize};
use std::fmt;

pub use crate::models::DocId;

/// Segment identifier, one per committed batch
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SegmentId(pub u64);

impl SegmentId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "segment_{}", self.0)
    }
}

/// A single posting entry within a posting list
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    /// Term frequency in this document's field
    pub term_frequency: u32,
    /// Word positions, empty when the field does not record them
    pub positions: Vec<u32>,
}

impl Posting {
    pub fn new(doc_id: DocId, term_frequency: u32, positions: Vec<u32>) -> Self {
        Self {
            doc_id,
            term_frequency,
            positions,
        }
    }
}

/// Occurrences of one term in one analyzed field
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TermOccurrences {
    pub frequency: u32,
    pub positions: Vec<u32>,
}
