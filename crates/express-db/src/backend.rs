//! Document store backend trait.

use async_trait::async_trait;

use crate::{DbResult, Document, DocumentRef, Precondition};

/// A document store backend.
///
/// Every call may cross the network, so each one is a suspension point.
/// Backends give no isolation between calls; the only atomic primitive is
/// [`update_if`](DocumentBackend::update_if) on a single document.
#[async_trait]
pub trait DocumentBackend: Send + Sync {
    /// Fetch a document by id.
    async fn get(&self, collection: &str, id: &str) -> DbResult<Option<Document>>;

    /// List all documents in a collection as `(id, document)` pairs.
    async fn list(&self, collection: &str) -> DbResult<Vec<(String, Document)>>;

    /// Insert a document under a store-assigned id and stamp its
    /// creation time into [`CREATED_AT_FIELD`](crate::CREATED_AT_FIELD).
    async fn add(&self, collection: &str, document: Document) -> DbResult<DocumentRef>;

    /// Create or replace a document under a caller-chosen id.
    async fn set(&self, collection: &str, id: &str, document: Document) -> DbResult<()>;

    /// Merge fields into an existing document.
    ///
    /// Fails with [`DbError::NotFound`](crate::DbError::NotFound) if the
    /// document does not exist.
    async fn update(&self, collection: &str, id: &str, fields: Document) -> DbResult<()>;

    /// Merge fields into an existing document only if the precondition
    /// holds, atomically with respect to other writers.
    ///
    /// Returns `false` without writing when the precondition fails.
    async fn update_if(
        &self,
        collection: &str,
        id: &str,
        precondition: &Precondition,
        fields: Document,
    ) -> DbResult<bool>;

    /// Delete a document. Deleting a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> DbResult<()>;
}
