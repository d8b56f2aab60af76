//! Index writer: documents to analyzed batches
//!
//! The writer applies the schema to every document of a batch before anything
//! reaches the store, so a batch either fails as a whole or is committed as a
//! whole. Document ids are assigned later, by the store, in batch order.

use serde_json::{Map, Value};
use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

use super::types::TermOccurrences;
use crate::error::WriteError;
use crate::models::Document;
use crate::schema::{Schema, RAW_FIELD};
use crate::tokenizer::Analyzer;

/// One analyzed field of a document
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnalyzedField {
    /// Field length in tokens
    pub length: u32,
    pub terms: HashMap<String, TermOccurrences>,
}

/// A document ready to be committed
#[derive(Clone, Debug, PartialEq)]
pub struct AnalyzedDocument {
    /// Stored field values, including the serialized raw document
    pub stored: Map<String, Value>,
    /// Indexed fields with at least one token
    pub fields: BTreeMap<String, AnalyzedField>,
}

/// Analyzed documents of one write call, in arrival order
#[derive(Clone, Debug, Default, PartialEq)]
pub struct IndexBatch {
    documents: Vec<AnalyzedDocument>,
}

impl IndexBatch {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[AnalyzedDocument] {
        &self.documents
    }

    pub fn into_documents(self) -> Vec<AnalyzedDocument> {
        self.documents
    }
}

/// Applies a schema to incoming documents
#[derive(Clone, Debug)]
pub struct IndexWriter {
    schema: Arc<Schema>,
}

impl IndexWriter {
    pub fn new(schema: Arc<Schema>) -> Self {
        Self { schema }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Analyze a batch of documents
    ///
    /// Fails on the first document that cannot be indexed; nothing of the
    /// batch is returned in that case.
    pub fn prepare<I>(&self, documents: I) -> Result<IndexBatch, WriteError>
    where
        I: IntoIterator<Item = Document>,
    {
        let documents = documents
            .into_iter()
            .enumerate()
            .map(|(position, doc)| self.analyze_document(position, &doc))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(documents = documents.len(), "Prepared index batch");
        Ok(IndexBatch { documents })
    }

    fn analyze_document(
        &self,
        position: usize,
        doc: &Document,
    ) -> Result<AnalyzedDocument, WriteError> {
        let declared = doc
            .fields()
            .any(|(name, _)| name != RAW_FIELD && self.schema.contains(name));
        if !declared {
            return Err(WriteError::NoDeclaredFields { position });
        }

        let raw = serde_json::to_string(doc).map_err(|e| WriteError::RawEncoding {
            position,
            reason: e.to_string(),
        })?;

        let mut stored = Map::new();
        let mut fields = BTreeMap::new();

        for (name, value) in doc.fields() {
            if name == RAW_FIELD || value.is_null() {
                continue;
            }
            let (Some(options), Some(analyzer)) =
                (self.schema.field(name), self.schema.analyzer_for(name))
            else {
                continue;
            };

            if options.indexed {
                let texts = field_texts(value).ok_or_else(|| WriteError::UnsupportedValue {
                    position,
                    field: name.clone(),
                })?;
                let field = analyze_field(analyzer, &texts, options.positions);
                if field.length > 0 {
                    fields.insert(name.clone(), field);
                }
            }

            if options.stored {
                stored.insert(name.clone(), value.clone());
            }
        }

        stored.insert(RAW_FIELD.to_string(), Value::String(raw));

        Ok(AnalyzedDocument { stored, fields })
    }
}

/// Text pieces of an indexable value; `None` for values that cannot be indexed
fn field_texts(value: &Value) -> Option<Vec<Cow<'_, str>>> {
    match value {
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(scalar_text)
            .collect(),
        other => scalar_text(other).map(|text| vec![text]),
    }
}

fn scalar_text(value: &Value) -> Option<Cow<'_, str>> {
    match value {
        Value::String(s) => Some(Cow::Borrowed(s.as_str())),
        Value::Number(n) => Some(Cow::Owned(n.to_string())),
        Value::Bool(b) => Some(Cow::Owned(b.to_string())),
        Value::Null => Some(Cow::Borrowed("")),
        Value::Array(_) | Value::Object(_) => None,
    }
}

fn analyze_field(analyzer: &Analyzer, texts: &[Cow<'_, str>], positions: bool) -> AnalyzedField {
    let mut field = AnalyzedField::default();
    // Array elements continue the position sequence of the previous element
    let mut base = 0u32;

    for text in texts {
        let mut next_base = base;
        for token in analyzer.analyze(text) {
            let position = base + token.position;
            next_base = position + 1;
            field.length += 1;

            let entry = field.terms.entry(token.term).or_default();
            entry.frequency += 1;
            if positions {
                entry.positions.push(position);
            }
        }
        base = next_base;
    }

    field
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;
    use crate::schema::FieldOptions;
    use serde_json::json;

    fn schema() -> Arc<Schema> {
        Arc::new(
            Schema::builder()
                .field("title", FieldOptions::text().stored())
                .field("content", FieldOptions::text())
                .field("id", FieldOptions::keyword().stored())
                .field("url", FieldOptions::stored_only())
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn test_prepare_batch() {
        let writer = IndexWriter::new(schema());
        let batch = writer
            .prepare(vec![
                Document::new()
                    .with("title", "Flow in pipes")
                    .with("content", "viscous flow flow"),
                Document::new().with("title", "Supersonic wing"),
            ])
            .unwrap();

        assert_eq!(batch.len(), 2);
        let first = &batch.documents()[0];

        let content = &first.fields["content"];
        assert_eq!(content.length, 3);
        assert_eq!(content.terms["flow"].frequency, 2);
        assert_eq!(content.terms["flow"].positions, vec![1, 2]);

        let title = &first.fields["title"];
        assert_eq!(title.terms["flow"].positions, vec![0]);
        assert_eq!(title.terms["pipe"].positions, vec![2]);
    }

    #[test]
    fn test_stored_fields_and_raw() {
        let writer = IndexWriter::new(schema());
        let doc = Document::new()
            .with("title", "Shock tube")
            .with("content", "not stored")
            .with("url", "http://example.org/1")
            .with("extra", json!({"nested": true}));
        let batch = writer.prepare(vec![doc.clone()]).unwrap();
        let stored = &batch.documents()[0].stored;

        assert_eq!(stored["title"], json!("Shock tube"));
        assert_eq!(stored["url"], json!("http://example.org/1"));
        assert!(!stored.contains_key("content"));
        assert!(!stored.contains_key("extra"));

        let raw: Document = serde_json::from_str(stored[RAW_FIELD].as_str().unwrap()).unwrap();
        assert_eq!(raw, doc);
    }

    #[test]
    fn test_scalars_and_arrays() {
        let writer = IndexWriter::new(schema());
        let batch = writer
            .prepare(vec![Document::new()
                .with("id", 42)
                .with("content", json!(["laminar flow", null, "turbulent flow"]))])
            .unwrap();
        let doc = &batch.documents()[0];

        assert!(doc.fields["id"].terms.contains_key("42"));
        let content = &doc.fields["content"];
        assert_eq!(content.length, 4);
        assert_eq!(content.terms["flow"].positions, vec![1, 3]);
    }

    #[test]
    fn test_null_is_absent() {
        let writer = IndexWriter::new(schema());
        let batch = writer
            .prepare(vec![Document::new().with("title", Value::Null).with("id", "a")])
            .unwrap();
        let doc = &batch.documents()[0];

        assert!(!doc.fields.contains_key("title"));
        assert!(!doc.stored.contains_key("title"));
    }

    #[test]
    fn test_no_declared_fields() {
        let writer = IndexWriter::new(schema());
        let err = writer
            .prepare(vec![
                Document::new().with("title", "wing"),
                Document::new().with("unknown", "wing"),
            ])
            .unwrap_err();
        assert_eq!(err, WriteError::NoDeclaredFields { position: 1 });

        let err = writer.prepare(vec![Document::new()]).unwrap_err();
        assert_eq!(err, WriteError::NoDeclaredFields { position: 0 });
    }

    #[test]
    fn test_raw_field_does_not_count_as_declared() {
        let writer = IndexWriter::new(schema());
        let err = writer
            .prepare(vec![Document::new().with(RAW_FIELD, "spoofed")])
            .unwrap_err();
        assert_eq!(err, WriteError::NoDeclaredFields { position: 0 });
    }

    #[test]
    fn test_object_value_rejected() {
        let writer = IndexWriter::new(schema());
        let err = writer
            .prepare(vec![Document::new().with("title", json!({"text": "wing"}))])
            .unwrap_err();
        assert_eq!(
            err,
            WriteError::UnsupportedValue {
                position: 0,
                field: "title".to_string()
            }
        );

        let err = writer
            .prepare(vec![Document::new().with("content", json!([["nested"]]))])
            .unwrap_err();
        assert!(matches!(err, WriteError::UnsupportedValue { .. }));
    }

    #[test]
    fn test_positions_disabled() {
        let schema = Schema::builder()
            .field(
                "body",
                FieldOptions::text()
                    .with_analyzer(AnalyzerConfig::simple())
                    .with_positions(false),
            )
            .build()
            .unwrap();
        let writer = IndexWriter::new(Arc::new(schema));
        let batch = writer
            .prepare(vec![Document::new().with("body", "heat heat transfer")])
            .unwrap();

        let heat = &batch.documents()[0].fields["body"].terms["heat"];
        assert_eq!(heat.frequency, 2);
        assert!(heat.positions.is_empty());
    }

    #[test]
    fn test_empty_batch() {
        let writer = IndexWriter::new(schema());
        let batch = writer.prepare(Vec::new()).unwrap();
        assert!(batch.is_empty());
    }
}
