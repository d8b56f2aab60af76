//! Free-text query parser
//!
//! Turns query text and a list of target fields into term clauses. The text
//! is analyzed once per distinct analyzer among the fields, so fields sharing
//! an analyzer share the same terms.

use std::collections::HashSet;
use std::sync::Arc;

use super::types::{MatchOperator, StructuredQuery, TermClause};
use crate::error::QueryError;
use crate::schema::Schema;
use crate::tokenizer::{AnalyzerRef, Token};

/// Query parser bound to a schema
#[derive(Clone, Debug)]
pub struct QueryParser {
    schema: Arc<Schema>,
}

impl QueryParser {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self { schema }
    }

    /// Parse a query with the default OR operator
    pub fn parse<S: AsRef<str>>(
        &self,
        text: &str,
        fields: &[S],
    ) -> Result<StructuredQuery, QueryError> {
        self.parse_with_operator(text, fields, MatchOperator::Or)
    }

    pub fn parse_with_operator<S: AsRef<str>>(
        &self,
        text: &str,
        fields: &[S],
        operator: MatchOperator,
    ) -> Result<StructuredQuery, QueryError> {
        let targets = self.resolve_fields(fields)?;

        // Analyzed text per distinct analyzer instance
        let mut analyzed: Vec<(AnalyzerRef, Vec<Token>)> = Vec::new();
        let mut clauses = Vec::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();

        for (field, analyzer) in &targets {
            let idx = match analyzed.iter().position(|(a, _)| Arc::ptr_eq(a, analyzer)) {
                Some(idx) => idx,
                None => {
                    analyzed.push((analyzer.clone(), analyzer.analyze(text).collect()));
                    analyzed.len() - 1
                }
            };

            for token in &analyzed[idx].1 {
                if seen.insert((field.clone(), token.term.clone())) {
                    clauses.push(
                        TermClause::new(field.clone(), token.term.clone(), token.position)
                            .in_group(idx as u32),
                    );
                }
            }
        }

        if clauses.is_empty() {
            return Err(QueryError::EmptyQuery);
        }

        let mut ordered: Vec<&TermClause> = clauses.iter().collect();
        ordered.sort_by_key(|c| c.slot);
        let mut terms: Vec<String> = Vec::new();
        for clause in ordered {
            if !terms.contains(&clause.term) {
                terms.push(clause.term.clone());
            }
        }

        Ok(StructuredQuery {
            clauses,
            operator,
            fields: targets.into_iter().map(|(name, _)| name).collect(),
            terms,
        })
    }

    fn resolve_fields<S: AsRef<str>>(
        &self,
        fields: &[S],
    ) -> Result<Vec<(String, AnalyzerRef)>, QueryError> {
        if fields.is_empty() {
            return Err(QueryError::NoFields);
        }

        let mut targets: Vec<(String, AnalyzerRef)> = Vec::with_capacity(fields.len());
        for name in fields {
            let name = name.as_ref();
            let options = self
                .schema
                .field(name)
                .ok_or_else(|| QueryError::UnknownField(name.to_string()))?;
            if !options.indexed {
                return Err(QueryError::FieldNotIndexed(name.to_string()));
            }
            let analyzer = self
                .schema
                .analyzer_for(name)
                .ok_or_else(|| QueryError::UnknownField(name.to_string()))?;
            if !targets.iter().any(|(existing, _)| existing == name) {
                targets.push((name.to_string(), analyzer.clone()));
            }
        }
        Ok(targets)
    }
}
