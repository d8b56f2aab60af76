//! Core types for the query system

use serde::{Deserialize, Serialize};

/// Operator for combining query words
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOperator {
    /// Every query word must match in at least one field. Fields are
    /// grouped by analyzer; a document matches when, within one group, every
    /// word that group's analyzer kept is found
    And,
    /// At least one query word must match in at least one field
    #[default]
    Or,
}

/// A single (field, term) match
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermClause {
    pub field: String,
    pub term: String,
    /// Word position of the originating word in the query text
    pub slot: u32,
    /// Index of the analyzer that produced the term; fields sharing an
    /// analyzer share a group
    #[serde(default)]
    pub group: u32,
}

impl TermClause {
    pub fn new(field: impl Into<String>, term: impl Into<String>, slot: u32) -> Self {
        Self {
            field: field.into(),
            term: term.into(),
            slot,
            group: 0,
        }
    }

    pub fn in_group(mut self, group: u32) -> Self {
        self.group = group;
        self
    }
}

/// Parsed query: term clauses over the cross product of fields and terms
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StructuredQuery {
    pub clauses: Vec<TermClause>,
    pub operator: MatchOperator,
    /// Target fields, deduplicated, in request order
    pub fields: Vec<String>,
    /// Distinct terms in order of first appearance
    pub terms: Vec<String>,
}

/// Query execution statistics
#[derive(Clone, Debug, Default)]
pub struct QueryStats {
    /// Number of documents matched
    pub docs_matched: u64,
    /// Number of postings read
    pub postings_read: u64,
    /// Query execution time in microseconds
    pub execution_time_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clause_group() {
        let clause = TermClause::new("id", "Heated pipes", 0).in_group(2);
        assert_eq!(clause.group, 2);
        assert_eq!(TermClause::new("title", "heat", 0).group, 0);

        let json = r#"{"field": "title", "term": "wing", "slot": 1}"#;
        let clause: TermClause = serde_json::from_str(json).unwrap();
        assert_eq!(clause, TermClause::new("title", "wing", 1));
    }

    #[test]
    fn test_operator_serde() {
        assert_eq!(serde_json::to_string(&MatchOperator::And).unwrap(), "\"and\"");
        let op: MatchOperator = serde_json::from_str("\"or\"").unwrap();
        assert_eq!(op, MatchOperator::Or);
        assert_eq!(MatchOperator::default(), MatchOperator::Or);
    }
}
