pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod highlight;
pub mod models;
pub mod query;
pub mod schema;
pub mod segment;
pub mod tokenizer;

pub use config::{AnalyzerConfig, EngineConfig, HighlightConfig};
pub use engine::SearchEngine;
pub use error::{QueryError, Result, SchemaError, SearchError, WriteError};
pub use highlight::Highlighter;
pub use models::*;
pub use query::{MatchOperator, QueryExecutor, QueryParser, StructuredQuery, TermClause};
pub use schema::{FieldOptions, Schema, SchemaBuilder, RAW_FIELD};
pub use segment::{Bm25Params, IndexReader, IndexStore, IndexWriter, MemoryIndex};
pub use tokenizer::{Analyzer, AnalyzerRef, Token};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
