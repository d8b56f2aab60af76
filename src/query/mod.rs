//! Query parsing and execution
//!
//! Free text plus a list of target fields becomes a [`StructuredQuery`]: one
//! term clause per (field, term) pair, combined with OR by default. The
//! [`QueryExecutor`] scores clauses with BM25+ against an index reader.

pub mod executor;
pub mod parser;
pub mod types;

pub use executor::{QueryExecutor, QueryResult, RankedHit};
pub use parser::QueryParser;
pub use types::*;
