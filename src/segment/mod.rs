//! Segment-based in-memory inverted index
//!
//! # Architecture
//!
//! - `IndexWriter`: applies the schema to a batch of documents
//! - `Segment`: immutable postings and stored records of one committed batch
//! - `IndexStore` / `IndexReader`: backend capability traits
//! - `MemoryIndex`: segments published through atomic snapshot swaps

mod index;
mod reader;
mod statistics;
mod store;
mod types;
mod writer;

pub use index::*;
pub use reader::*;
pub use statistics::*;
pub use store::*;
pub use types::*;
pub use writer::*;
