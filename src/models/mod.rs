pub mod document;
pub mod search;

pub use document::{DocId, Document, StoredDocument};
pub use search::{SearchHit, SearchRequest, SearchResponse};
