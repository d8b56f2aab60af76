//! Search engine façade
//!
//! Composes schema, writer, store, parser, executor and highlighter behind a
//! small API. All operations take `&self`; the store serializes writes and
//! queries run against the snapshot of the last completed commit.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::error::{Result, SearchError};
use crate::highlight::Highlighter;
use crate::models::{DocId, Document, SearchHit, SearchRequest, SearchResponse, StoredDocument};
use crate::query::{MatchOperator, QueryExecutor, QueryParser, StructuredQuery};
use crate::schema::Schema;
use crate::segment::{IndexReader, IndexStore, IndexWriter, MemoryIndex};

/// Document search engine over an index store
pub struct SearchEngine<S: IndexStore = MemoryIndex> {
    schema: Arc<Schema>,
    config: EngineConfig,
    store: S,
    writer: IndexWriter,
    parser: QueryParser,
    executor: QueryExecutor,
    highlighter: Highlighter,
}

impl SearchEngine<MemoryIndex> {
    /// Create an engine over an empty in-memory index
    pub fn new(schema: Schema, config: EngineConfig) -> Self {
        Self::with_store(schema, config, MemoryIndex::new())
    }
}

impl<S: IndexStore> SearchEngine<S> {
    /// Create an engine over the given store
    pub fn with_store(schema: Schema, config: EngineConfig, store: S) -> Self {
        let schema = Arc::new(schema);
        info!(
            fields = schema.len(),
            limit = config.default_limit,
            "Created search engine"
        );
        Self {
            writer: IndexWriter::new(schema.clone()),
            parser: QueryParser::new(schema.clone()),
            executor: QueryExecutor::new(config.bm25.clone()),
            highlighter: Highlighter::new(config.highlight.clone()),
            schema,
            config,
            store,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Index a batch of documents
    ///
    /// Either every document becomes visible or, on error, none does.
    /// Returns the number of documents indexed.
    pub fn index_documents<I>(&self, documents: I) -> Result<usize>
    where
        I: IntoIterator<Item = Document>,
    {
        let batch = self.writer.prepare(documents)?;
        let count = batch.len();
        let ids = self.store.write(batch)?;
        info!("Indexed {} documents (ids {:?})", count, ids);
        Ok(count)
    }

    /// Number of indexed documents
    pub fn index_size(&self) -> Result<u64> {
        self.store.count()
    }

    /// Run a query and return the matching raw documents, best first
    ///
    /// At most `default_limit` documents are returned. With `highlight`, every
    /// requested field that is present and textual is replaced by its
    /// highlighted excerpt, or kept as is when it has no match.
    pub fn query<F: AsRef<str>>(
        &self,
        text: &str,
        fields: &[F],
        highlight: bool,
    ) -> Result<Vec<Document>> {
        let response = self.run(
            text,
            fields,
            self.config.default_limit,
            self.config.operator,
            highlight,
        )?;
        Ok(response.into_documents())
    }

    /// Run a search request with scores and match details
    pub fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        self.run(
            &request.query,
            request.fields.as_slice(),
            request.limit.unwrap_or(self.config.default_limit),
            request.operator.unwrap_or(self.config.operator),
            request.highlight,
        )
    }

    /// The original document with the given id
    pub fn document(&self, doc_id: DocId) -> Result<Option<Document>> {
        self.stored(doc_id)?
            .map(|stored| stored.raw_document())
            .transpose()
    }

    /// The stored record of a document
    pub fn stored(&self, doc_id: DocId) -> Result<Option<StoredDocument>> {
        Ok(self.store.reader()?.stored(doc_id))
    }

    /// Close the underlying store; later calls fail with a backend error
    pub fn close(&self) {
        self.store.close();
        info!("Closed search engine");
    }

    fn run<F: AsRef<str>>(
        &self,
        text: &str,
        fields: &[F],
        limit: usize,
        operator: MatchOperator,
        highlight: bool,
    ) -> Result<SearchResponse> {
        let start = Instant::now();
        let query = self.parser.parse_with_operator(text, fields, operator)?;
        let reader = self.store.reader()?;
        let result = self.executor.execute(&query, &reader, limit);

        let mut hits = Vec::with_capacity(result.hits.len());
        for ranked in result.hits {
            let stored = reader.stored(ranked.doc_id).ok_or_else(|| {
                SearchError::Backend(format!("document {} missing from store", ranked.doc_id))
            })?;
            let mut document = stored.raw_document()?;
            if highlight {
                self.highlight_document(&mut document, &query);
            }
            hits.push(SearchHit {
                doc_id: ranked.doc_id,
                score: ranked.score,
                document,
                matched: ranked.matched,
            });
        }

        debug!(
            query = text,
            operator = ?operator,
            hits = hits.len(),
            total_hits = result.total_hits,
            postings = result.stats.postings_read,
            "Executed query"
        );

        Ok(SearchResponse {
            hits,
            total_hits: result.total_hits,
            took_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn highlight_document(&self, document: &mut Document, query: &StructuredQuery) {
        for field in &query.fields {
            let Some(analyzer) = self.schema.analyzer_for(field) else {
                continue;
            };
            if let Some(value) = document.get_mut(field) {
                let highlighted = self
                    .highlighter
                    .highlight_value(value, analyzer, query.terms.as_slice());
                *value = highlighted;
            }
        }
    }
}

impl<S: IndexStore + std::fmt::Debug> std::fmt::Debug for SearchEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("schema", &self.schema)
            .field("config", &self.config)
            .field("store", &self.store)
            .finish()
    }
}
