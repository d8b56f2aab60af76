use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::document::{DocId, Document};
use crate::query::MatchOperator;

/// Search request with explicit limit, operator and highlight options
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub fields: Vec<String>,
    /// Maximum number of hits; the engine default when unset
    #[serde(default)]
    pub limit: Option<usize>,
    /// Match operator; the engine default when unset
    #[serde(default)]
    pub operator: Option<MatchOperator>,
    #[serde(default = "default_highlight")]
    pub highlight: bool,
}

fn default_highlight() -> bool {
    true
}

impl SearchRequest {
    pub fn new<I, F>(query: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Into<String>,
    {
        Self {
            query: query.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            limit: None,
            operator: None,
            highlight: true,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_operator(mut self, operator: MatchOperator) -> Self {
        self.operator = Some(operator);
        self
    }

    pub fn with_highlight(mut self, highlight: bool) -> Self {
        self.highlight = highlight;
        self
    }
}

/// A single ranked hit
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchHit {
    pub doc_id: DocId,
    pub score: f32,
    /// The raw document, highlighted when requested
    pub document: Document,
    /// Matched terms per field
    pub matched: BTreeMap<String, BTreeSet<String>>,
}

/// Search response with timing information
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    /// Number of matching documents before the limit was applied
    pub total_hits: u64,
    pub took_ms: u64,
}

impl SearchResponse {
    /// The hit documents in ranked order
    pub fn into_documents(self) -> Vec<Document> {
        self.hits.into_iter().map(|hit| hit.document).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_request_builder() {
        let req = SearchRequest::new("boundary layer", ["title", "content"])
            .with_limit(5)
            .with_operator(MatchOperator::And)
            .with_highlight(false);

        assert_eq!(req.fields, vec!["title", "content"]);
        assert_eq!(req.limit, Some(5));
        assert_eq!(req.operator, Some(MatchOperator::And));
        assert!(!req.highlight);
    }

    #[test]
    fn test_search_request_defaults() {
        let req: SearchRequest =
            serde_json::from_str(r#"{"query": "wing", "fields": ["title"]}"#).unwrap();
        assert!(req.limit.is_none());
        assert!(req.operator.is_none());
        assert!(req.highlight);
    }

    #[test]
    fn test_response_documents() {
        let response = SearchResponse {
            hits: vec![SearchHit {
                doc_id: 4,
                score: 1.5,
                document: Document::new().with("title", "wing"),
                matched: BTreeMap::new(),
            }],
            total_hits: 1,
            took_ms: 0,
        };

        assert_eq!(response.into_documents()[0].get_str("title"), Some("wing"));
    }
}
