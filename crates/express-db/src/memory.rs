//! In-memory document store backend.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde_json::Value;

use crate::{
    DbError, DbResult, Document, DocumentBackend, DocumentRef, Precondition, CREATED_AT_FIELD,
};

/// Length of store-assigned document ids.
const GENERATED_ID_LEN: usize = 20;

/// Collections keyed by name, documents keyed by id.
pub(crate) type Collections = HashMap<String, BTreeMap<String, Document>>;

/// In-memory document store (for development and testing).
///
/// Each call takes the lock once, so [`update_if`](DocumentBackend::update_if)
/// is atomic while separate `get`/`update` calls are not.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    collections: Mutex<Collections>,
}

impl MemoryBackend {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with collections.
    pub(crate) fn from_collections(collections: Collections) -> Self {
        Self {
            collections: Mutex::new(collections),
        }
    }

    /// Copy out every collection.
    pub(crate) fn snapshot(&self) -> DbResult<Collections> {
        Ok(self.lock()?.clone())
    }

    /// Replace every collection with `collections`.
    pub(crate) fn restore(&self, collections: Collections) -> DbResult<()> {
        *self.lock()? = collections;
        Ok(())
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Collections>> {
        self.collections
            .lock()
            .map_err(|e| DbError::Unavailable(format!("store lock poisoned: {}", e)))
    }
}

fn generate_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_ID_LEN)
        .map(char::from)
        .collect()
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    async fn get(&self, collection: &str, id: &str) -> DbResult<Option<Document>> {
        let collections = self.lock()?;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn list(&self, collection: &str) -> DbResult<Vec<(String, Document)>> {
        let collections = self.lock()?;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, doc)| (id.clone(), doc.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn add(&self, collection: &str, mut document: Document) -> DbResult<DocumentRef> {
        let created_at = Utc::now();
        document.insert(
            CREATED_AT_FIELD.to_string(),
            Value::String(created_at.to_rfc3339()),
        );

        let mut collections = self.lock()?;
        let docs = collections.entry(collection.to_string()).or_default();
        let mut id = generate_id();
        while docs.contains_key(&id) {
            id = generate_id();
        }
        docs.insert(id.clone(), document);

        Ok(DocumentRef { id, created_at })
    }

    async fn set(&self, collection: &str, id: &str, document: Document) -> DbResult<()> {
        let mut collections = self.lock()?;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: Document) -> DbResult<()> {
        let mut collections = self.lock()?;
        let document = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| DbError::not_found(collection, id))?;
        document.extend(fields);
        Ok(())
    }

    async fn update_if(
        &self,
        collection: &str,
        id: &str,
        precondition: &Precondition,
        fields: Document,
    ) -> DbResult<bool> {
        let mut collections = self.lock()?;
        let document = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| DbError::not_found(collection, id))?;

        if !precondition.holds(document) {
            return Ok(false);
        }
        document.extend(fields);
        Ok(true)
    }

    async fn delete(&self, collection: &str, id: &str) -> DbResult<()> {
        let mut collections = self.lock()?;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}
