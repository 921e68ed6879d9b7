//! Document store error types.

use thiserror::Error;

/// Result alias for document store operations.
pub type DbResult<T> = Result<T, DbError>;

/// Errors that can occur when using the document store.
#[derive(Error, Debug)]
pub enum DbError {
    /// The store could not be reached or refused the operation.
    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    /// A document that must exist was missing.
    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// Failed to encode or decode a document.
    #[error("Deserialization error: {0}")]
    DeserializeError(String),

    /// A value was not a JSON object and cannot be stored as a document.
    #[error("Not a document: {0}")]
    NotADocument(String),

    /// Persisting the store to disk failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DbError {
    /// Build a not-found error for a collection/id pair.
    pub fn not_found(collection: &str, id: &str) -> Self {
        DbError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    /// Check whether this error reports a missing document.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DbError::NotFound { .. })
    }
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        DbError::DeserializeError(e.to_string())
    }
}
