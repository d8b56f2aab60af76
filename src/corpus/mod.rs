//! Document and query sources for test collections

pub mod cranfield;

pub use cranfield::{
    collection_schema, parse_collection, parse_queries, query_schema, read_collection,
    read_queries, SECTION_FIELDS,
};
