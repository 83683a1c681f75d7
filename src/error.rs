use crate::session::SessionError;
use thiserror::Error;

/// Domain failures reported by the table store.
///
/// Handlers collapse all of these into a generic "Failed to ..." response;
/// the variants exist for logging and for library callers.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Table '{0}' not found")]
    TableNotFound(String),
    #[error("Table '{0}' already exists")]
    TableAlreadyExists(String),
    #[error("Table '{0}' has no columns")]
    EmptySchema(String),
    #[error("Row {index} out of range (table has {len} rows)")]
    RowOutOfRange { index: i64, len: usize },
    #[error("Column '{0}' not found")]
    ColumnNotFound(String),
    #[error("Column count mismatch: expected {expected}, got {actual}")]
    ColumnCountMismatch { expected: usize, actual: usize },
    #[error("Value '{value}' does not match type of column '{column}'")]
    TypeMismatch { column: String, value: String },
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("Table store lock poisoned")]
    LockPoisoned,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
