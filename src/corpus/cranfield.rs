//! Cranfield collection reader
//!
//! Collection files hold records introduced by `.I <id>`, with `.T` (title),
//! `.A` (author), `.B` (bibliography) and `.W` (content) sections whose text
//! may continue over several lines. Query files hold `.I <id>` records with
//! the query text after a `.W` line.

use serde_json::Value;
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

use crate::config::AnalyzerConfig;
use crate::error::Result;
use crate::models::Document;
use crate::schema::{FieldOptions, Schema};

/// Text sections of a collection record, also the default search fields
pub const SECTION_FIELDS: [&str; 4] = ["title", "author", "bibliography", "content"];

/// Schema for parsed collection documents
///
/// Title and content are stemmed; author and bibliography are lowercased
/// only, so names and citations match as written. Every section is searchable.
pub fn collection_schema() -> Result<Schema> {
    let plain = FieldOptions::text()
        .with_analyzer(AnalyzerConfig::simple())
        .stored();
    Ok(Schema::builder()
        .field("id", FieldOptions::keyword().stored())
        .field("title", FieldOptions::text().stored())
        .field("author", plain.clone())
        .field("bibliography", plain)
        .field("content", FieldOptions::text().stored())
        .build()?)
}

/// Schema for parsed query documents
pub fn query_schema() -> Result<Schema> {
    Ok(Schema::builder()
        .field("id", FieldOptions::keyword().stored())
        .field("query", FieldOptions::text().stored())
        .build()?)
}

fn section_field(marker: &str) -> Option<usize> {
    match marker {
        ".T" => Some(0),
        ".A" => Some(1),
        ".B" => Some(2),
        ".W" => Some(3),
        _ => None,
    }
}

/// Split a line into its section marker and the remaining text
fn split_marker(line: &str) -> Option<(&str, &str)> {
    if !line.starts_with('.') || line.len() < 2 || !line.is_char_boundary(2) {
        return None;
    }
    let (marker, rest) = line.split_at(2);
    if rest.is_empty() || rest.starts_with(char::is_whitespace) {
        Some((marker, rest.trim()))
    } else {
        None
    }
}

struct Record {
    id: u64,
    sections: [Vec<String>; 4],
}

impl Record {
    fn into_document(self) -> Document {
        let mut doc = Document::new().with("id", self.id);
        for (name, parts) in SECTION_FIELDS.iter().zip(self.sections) {
            doc.insert(*name, Value::String(parts.join(" ")));
        }
        doc
    }
}

/// Parse a Cranfield collection into documents with the fields `id`,
/// `title`, `author`, `bibliography` and `content`
pub fn parse_collection(text: &str) -> Result<Vec<Document>> {
    let mut documents = Vec::new();
    let mut current: Option<Record> = None;
    let mut section: Option<usize> = None;

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        match split_marker(line) {
            Some((".I", id)) => {
                if let Some(record) = current.take() {
                    documents.push(record.into_document());
                }
                let id = id.parse::<u64>().map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("invalid document id {:?} on line {}", id, line_no + 1),
                    )
                })?;
                current = Some(Record {
                    id,
                    sections: Default::default(),
                });
                section = None;
            }
            Some((marker, rest)) if section_field(marker).is_some() => {
                section = section_field(marker);
                if let (Some(record), Some(idx), false) = (current.as_mut(), section, rest.is_empty())
                {
                    record.sections[idx].push(rest.to_string());
                }
            }
            _ => {
                if let (Some(record), Some(idx), false) = (current.as_mut(), section, line.is_empty())
                {
                    record.sections[idx].push(line.to_string());
                }
            }
        }
    }

    if let Some(record) = current {
        documents.push(record.into_document());
    }

    debug!(documents = documents.len(), "Parsed Cranfield collection");
    Ok(documents)
}

/// Parse a Cranfield query file into documents with the fields `id` (text)
/// and `query`
pub fn parse_queries(text: &str) -> Vec<Document> {
    let mut queries = Vec::new();
    let mut current: Option<(String, Vec<String>)> = None;
    let mut in_text = false;

    let flush = |current: Option<(String, Vec<String>)>, queries: &mut Vec<Document>| {
        if let Some((id, lines)) = current {
            queries.push(Document::new().with("id", id).with("query", lines.join(" ")));
        }
    };

    for line in text.lines() {
        let line = line.trim();
        match split_marker(line) {
            Some((".I", id)) => {
                flush(current.take(), &mut queries);
                current = Some((id.to_string(), Vec::new()));
                in_text = false;
            }
            Some((".W", rest)) => {
                in_text = true;
                if let (Some((_, lines)), false) = (current.as_mut(), rest.is_empty()) {
                    lines.push(rest.to_string());
                }
            }
            _ => {
                if let (Some((_, lines)), true, false) = (current.as_mut(), in_text, line.is_empty())
                {
                    lines.push(line.to_string());
                }
            }
        }
    }
    flush(current, &mut queries);

    debug!(queries = queries.len(), "Parsed Cranfield queries");
    queries
}

/// Read and parse a Cranfield collection file
pub fn read_collection(path: impl AsRef<Path>) -> Result<Vec<Document>> {
    let text = fs::read_to_string(path)?;
    parse_collection(&text)
}

/// Read and parse a Cranfield query file
pub fn read_queries(path: impl AsRef<Path>) -> Result<Vec<Document>> {
    let text = fs::read_to_string(path)?;
    Ok(parse_queries(&text))
}
