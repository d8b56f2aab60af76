use thiserror::Error;

/// Invalid or conflicting field declarations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Field name must not be empty")]
    EmptyFieldName,

    #[error("Field '{0}' is reserved for the raw document")]
    ReservedField(String),

    #[error("Field '{name}' declared twice with conflicting options")]
    ConflictingField { name: String },

    #[error("Unsupported analyzer language: {0}")]
    UnsupportedLanguage(String),
}

/// A document that cannot be indexed under the declared schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WriteError {
    #[error("Document at batch position {position} references no declared field")]
    NoDeclaredFields { position: usize },

    #[error("Field '{field}' of document at batch position {position} holds a value that cannot be indexed")]
    UnsupportedValue { position: usize, field: String },

    #[error("Document at batch position {position} could not be serialized: {reason}")]
    RawEncoding { position: usize, reason: String },
}

/// A malformed query or one that reduces to nothing
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("At least one field must be given")]
    NoFields,

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Field '{0}' is not indexed")]
    FieldNotIndexed(String),

    #[error("Query has no searchable terms after analysis")]
    EmptyQuery,
}

/// Main error type for lectern operations
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Write error: {0}")]
    Write(#[from] WriteError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for lectern operations
pub type Result<T> = std::result::Result<T, SearchError>;

impl SearchError {
    /// Check if this error indicates a transient failure that could be retried
    pub fn is_retriable(&self) -> bool {
        matches!(self, SearchError::Backend(_))
    }

    pub fn is_query_error(&self) -> bool {
        matches!(self, SearchError::Query(_))
    }
}
