//! Typed access to a document store.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::{DbError, DbResult, Document, DocumentBackend, DocumentRef, Precondition, ID_FIELD};

/// Handle to a document store.
///
/// Cheap to clone; all clones share one backend. Typed reads inject the
/// document id into the `id` field before deserializing, and typed writes
/// strip it again, so models can carry their id as an ordinary field.
#[derive(Clone)]
pub struct Db {
    backend: Arc<dyn DocumentBackend>,
}

impl fmt::Debug for Db {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db").finish_non_exhaustive()
    }
}

impl Db {
    /// Wrap a backend.
    pub fn new(backend: impl DocumentBackend + 'static) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }

    /// Wrap an already shared backend.
    pub fn from_arc(backend: Arc<dyn DocumentBackend>) -> Self {
        Self { backend }
    }

    /// Access the raw backend.
    pub fn backend(&self) -> &dyn DocumentBackend {
        self.backend.as_ref()
    }

    /// Fetch a document and deserialize it.
    ///
    /// Returns `None` if the document does not exist.
    pub async fn get_as<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> DbResult<Option<T>> {
        match self.backend.get(collection, id).await? {
            Some(document) => Ok(Some(from_document(id, document)?)),
            None => Ok(None),
        }
    }

    /// Fetch a document that must exist.
    pub async fn get_required<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> DbResult<T> {
        self.get_as(collection, id)
            .await?
            .ok_or_else(|| DbError::not_found(collection, id))
    }

    /// List and deserialize every document in a collection.
    pub async fn list_as<T: DeserializeOwned>(&self, collection: &str) -> DbResult<Vec<T>> {
        self.backend
            .list(collection)
            .await?
            .into_iter()
            .map(|(id, document)| from_document(&id, document))
            .collect()
    }

    /// Insert a value under a store-assigned id.
    pub async fn add_as<T: Serialize>(&self, collection: &str, value: &T) -> DbResult<DocumentRef> {
        self.backend.add(collection, to_document(value)?).await
    }

    /// Create or replace a value under a chosen id.
    pub async fn set_as<T: Serialize>(&self, collection: &str, id: &str, value: &T) -> DbResult<()> {
        self.backend.set(collection, id, to_document(value)?).await
    }

    /// Merge fields into an existing document.
    pub async fn update(&self, collection: &str, id: &str, fields: Document) -> DbResult<()> {
        self.backend.update(collection, id, fields).await
    }

    /// Merge fields only while the precondition holds.
    pub async fn update_if(
        &self,
        collection: &str,
        id: &str,
        precondition: &Precondition,
        fields: Document,
    ) -> DbResult<bool> {
        self.backend
            .update_if(collection, id, precondition, fields)
            .await
    }

    /// Delete a document.
    pub async fn delete(&self, collection: &str, id: &str) -> DbResult<()> {
        self.backend.delete(collection, id).await
    }
}

/// Serialize a value into a document, dropping its `id` field.
pub(crate) fn to_document<T: Serialize>(value: &T) -> DbResult<Document> {
    match serde_json::to_value(value)? {
        Value::Object(mut document) => {
            document.remove(ID_FIELD);
            Ok(document)
        }
        other => Err(DbError::NotADocument(other.to_string())),
    }
}

/// Deserialize a document, injecting its id.
pub(crate) fn from_document<T: DeserializeOwned>(id: &str, mut document: Document) -> DbResult<T> {
    document.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
    Ok(serde_json::from_value(Value::Object(document))?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fields, MemoryBackend};
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Product {
        #[serde(default)]
        id: String,
        name: String,
        stock: i64,
    }

    #[tokio::test]
    async fn test_typed_round_trip_injects_id() {
        let db = Db::new(MemoryBackend::new());
        let product = Product {
            id: "ignored".to_string(),
            name: "Cetirizine".to_string(),
            stock: 7,
        };

        db.set_as("products", "cetirizine", &product).await.unwrap();
        let raw = db.backend().get("products", "cetirizine").await.unwrap().unwrap();
        assert!(!raw.contains_key(ID_FIELD));

        let loaded: Product = db.get_required("products", "cetirizine").await.unwrap();
        assert_eq!(loaded.id, "cetirizine");
        assert_eq!(loaded.stock, 7);
    }

    #[tokio::test]
    async fn test_get_required_missing() {
        let db = Db::new(MemoryBackend::new());
        let err = db
            .get_required::<Product>("products", "missing")
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_as() {
        let db = Db::new(MemoryBackend::new());
        db.backend()
            .set("products", "a", fields! { "name" => "A", "stock" => 1 })
            .await
            .unwrap();
        db.backend()
            .set("products", "b", fields! { "name" => "B", "stock" => 0 })
            .await
            .unwrap();

        let products: Vec<Product> = db.list_as("products").await.unwrap();
        assert_eq!(products.len(), 2);
        assert!(products.iter().any(|p| p.id == "b" && p.stock == 0));
    }

    #[tokio::test]
    async fn test_scalar_is_not_a_document() {
        let db = Db::new(MemoryBackend::new());
        let err = db.set_as("products", "x", &42).await.unwrap_err();
        assert!(matches!(err, DbError::NotADocument(_)));
    }
}
