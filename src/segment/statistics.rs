//! Field statistics for BM25+ scoring
//!
//! Each segment keeps per-field document counts and summed lengths; a
//! snapshot merges them so scoring sees index-wide average field lengths.

use serde::{Deserialize, Serialize};

/// BM25+ parameters
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    /// Term frequency saturation parameter
    pub k1: f32,
    /// Length normalization parameter
    pub b: f32,
    /// BM25+ delta parameter (avoids zero scores for high-frequency terms)
    pub delta: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: 1.2,
            b: 0.75,
            delta: 1.0,
        }
    }
}

/// Length statistics of one field
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldStatistics {
    /// Documents with at least one token in this field
    pub doc_count: u64,
    /// Sum of field lengths in tokens
    pub total_length: u64,
}

impl FieldStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one document's field length
    pub fn add_document(&mut self, length: u32) {
        self.doc_count += 1;
        self.total_length += length as u64;
    }

    /// Merge statistics from another segment
    pub fn merge(&mut self, other: &FieldStatistics) {
        self.doc_count += other.doc_count;
        self.total_length += other.total_length;
    }

    /// Average field length
    pub fn avgdl(&self) -> f64 {
        if self.doc_count == 0 {
            0.0
        } else {
            self.total_length as f64 / self.doc_count as f64
        }
    }

    /// Compute the BM25+ contribution of a term occurrence
    pub fn bm25_score(
        &self,
        tf: f32,
        df: u64,
        total_docs: u64,
        doc_len: u32,
        params: &Bm25Params,
    ) -> f32 {
        let avgdl = self.avgdl() as f32;
        if avgdl == 0.0 || total_docs == 0 || tf == 0.0 {
            return 0.0;
        }

        let idf = idf(df, total_docs);

        // Length normalization
        let doc_len = doc_len as f32;
        let norm = 1.0 - params.b + params.b * (doc_len / avgdl);

        // BM25+ formula (with delta to avoid zero scores)
        let tf_component = (tf * (params.k1 + 1.0)) / (tf + params.k1 * norm);
        idf * (tf_component + params.delta)
    }
}

/// Robertson-Sparck-Jones IDF, always positive
pub fn idf(df: u64, total_docs: u64) -> f32 {
    let n = total_docs as f32;
    let df = df as f32;
    ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
}
