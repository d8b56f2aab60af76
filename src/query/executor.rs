//! Query executor: BM25+ scoring over posting lists
//!
//! Every (field, term) clause contributes a BM25+ score to each document in
//! its posting list; contributions are summed per document. Results are
//! ordered by descending score, ties broken by ascending doc id.

use ordered_float::OrderedFloat;
use roaring::RoaringTreemap;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Instant;

use super::types::{MatchOperator, QueryStats, StructuredQuery};
use crate::segment::{Bm25Params, DocId, FieldStatistics, IndexReader};

/// A scored document with the terms it matched per field
#[derive(Clone, Debug, PartialEq)]
pub struct RankedHit {
    pub doc_id: DocId,
    pub score: f32,
    pub matched: BTreeMap<String, BTreeSet<String>>,
}

/// Query execution result
#[derive(Debug)]
pub struct QueryResult {
    /// Top hits, best first
    pub hits: Vec<RankedHit>,
    /// Total number of matching documents, before the limit
    pub total_hits: u64,
    pub stats: QueryStats,
}

/// Query executor for running parsed queries against a reader
#[derive(Clone, Debug, Default)]
pub struct QueryExecutor {
    params: Bm25Params,
}

impl QueryExecutor {
    pub fn new(params: Bm25Params) -> Self {
        Self { params }
    }

    /// Execute a query and return the top `limit` hits
    pub fn execute<R: IndexReader + ?Sized>(
        &self,
        query: &StructuredQuery,
        reader: &R,
        limit: usize,
    ) -> QueryResult {
        let start = Instant::now();
        let total_docs = reader.doc_count();

        let mut scores: HashMap<DocId, RankedHit> = HashMap::new();
        // Documents matching each word slot, per analyzer group
        let mut slot_matches: BTreeMap<u32, BTreeMap<u32, RoaringTreemap>> = BTreeMap::new();
        let mut field_stats: HashMap<&str, FieldStatistics> = HashMap::new();
        let mut postings_read = 0u64;

        if total_docs > 0 {
            for clause in &query.clauses {
                let postings = reader.postings_for(&clause.field, &clause.term);
                let slot_docs = slot_matches
                    .entry(clause.group)
                    .or_default()
                    .entry(clause.slot)
                    .or_default();
                if postings.is_empty() {
                    continue;
                }
                postings_read += postings.len() as u64;

                let stats = *field_stats
                    .entry(clause.field.as_str())
                    .or_insert_with(|| reader.field_statistics(&clause.field));
                let df = postings.len() as u64;

                for posting in &postings {
                    let doc_len = reader.field_length(&clause.field, posting.doc_id);
                    let score = stats.bm25_score(
                        posting.term_frequency as f32,
                        df,
                        total_docs,
                        doc_len,
                        &self.params,
                    );

                    let hit = scores.entry(posting.doc_id).or_insert_with(|| RankedHit {
                        doc_id: posting.doc_id,
                        score: 0.0,
                        matched: BTreeMap::new(),
                    });
                    hit.score += score;
                    hit.matched
                        .entry(clause.field.clone())
                        .or_default()
                        .insert(clause.term.clone());
                    slot_docs.insert(posting.doc_id);
                }
            }
        }

        if query.operator == MatchOperator::And {
            let accepted = slot_matches
                .into_values()
                .map(|slots| Self::intersect(slots.into_values()))
                .fold(RoaringTreemap::new(), |acc, docs| acc | docs);
            scores.retain(|doc_id, _| accepted.contains(*doc_id));
        }

        let mut hits: Vec<RankedHit> = scores.into_values().collect();
        hits.sort_by(|a, b| {
            OrderedFloat(b.score)
                .cmp(&OrderedFloat(a.score))
                .then_with(|| a.doc_id.cmp(&b.doc_id))
        });

        let total_hits = hits.len() as u64;
        hits.truncate(limit);

        QueryResult {
            hits,
            total_hits,
            stats: QueryStats {
                docs_matched: total_hits,
                postings_read,
                execution_time_us: start.elapsed().as_micros() as u64,
            },
        }
    }

    /// Documents present in every slot set of one group
    fn intersect(mut sets: impl Iterator<Item = RoaringTreemap>) -> RoaringTreemap {
        let Some(first) = sets.next() else {
            return RoaringTreemap::new();
        };
        sets.fold(first, |acc, set| acc & set)
    }
}
