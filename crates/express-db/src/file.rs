//! JSON-file document store backend.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::memory::{Collections, MemoryBackend};
use crate::{DbResult, Document, DocumentBackend, DocumentRef, Precondition};

/// Document store persisted as a single JSON file.
///
/// Reads are served from memory; every write rewrites the file. Intended
/// for local development and the command line tool, not for shared use.
#[derive(Debug)]
pub struct JsonFileBackend {
    path: PathBuf,
    inner: MemoryBackend,
}

impl JsonFileBackend {
    /// Open a store file, starting empty if it does not exist yet.
    pub fn open(path: impl Into<PathBuf>) -> DbResult<Self> {
        let path = path.into();
        let collections: Collections = if path.exists() {
            let content = fs::read(&path)?;
            if content.is_empty() {
                Collections::new()
            } else {
                serde_json::from_slice(&content)?
            }
        } else {
            Collections::new()
        };

        Ok(Self {
            path,
            inner: MemoryBackend::from_collections(collections),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> DbResult<()> {
        let snapshot = self.inner.snapshot()?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&snapshot)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "document store flushed");
        Ok(())
    }

    /// Flush a change already applied in memory, putting `before` back if
    /// the file cannot be written.
    fn commit(&self, before: Collections) -> DbResult<()> {
        if let Err(e) = self.flush() {
            warn!(path = %self.path.display(), error = %e, "flush failed, change rolled back");
            self.inner.restore(before)?;
            return Err(e);
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentBackend for JsonFileBackend {
    async fn get(&self, collection: &str, id: &str) -> DbResult<Option<Document>> {
        self.inner.get(collection, id).await
    }

    async fn list(&self, collection: &str) -> DbResult<Vec<(String, Document)>> {
        self.inner.list(collection).await
    }

    async fn add(&self, collection: &str, document: Document) -> DbResult<DocumentRef> {
        let before = self.inner.snapshot()?;
        let created = self.inner.add(collection, document).await?;
        self.commit(before)?;
        Ok(created)
    }

    async fn set(&self, collection: &str, id: &str, document: Document) -> DbResult<()> {
        let before = self.inner.snapshot()?;
        self.inner.set(collection, id, document).await?;
        self.commit(before)
    }

    async fn update(&self, collection: &str, id: &str, fields: Document) -> DbResult<()> {
        let before = self.inner.snapshot()?;
        self.inner.update(collection, id, fields).await?;
        self.commit(before)
    }

    async fn update_if(
        &self,
        collection: &str,
        id: &str,
        precondition: &Precondition,
        fields: Document,
    ) -> DbResult<bool> {
        let before = self.inner.snapshot()?;
        let applied = self
            .inner
            .update_if(collection, id, precondition, fields)
            .await?;
        if applied {
            self.commit(before)?;
        }
        Ok(applied)
    }

    async fn delete(&self, collection: &str, id: &str) -> DbResult<()> {
        let before = self.inner.snapshot()?;
        self.inner.delete(collection, id).await?;
        self.commit(before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields;

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let store = JsonFileBackend::open(&path).unwrap();
        store
            .set("products", "p1", fields! { "name" => "Paracetamol", "stock" => 12 })
            .await
            .unwrap();
        let created = store
            .add("orders", fields! { "status" => "Pending" })
            .await
            .unwrap();
        drop(store);

        let reopened = JsonFileBackend::open(&path).unwrap();
        let product = reopened.get("products", "p1").await.unwrap().unwrap();
        assert_eq!(product["stock"], 12);
        assert!(reopened.get("orders", &created.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_failed_flush_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileBackend::open(dir.path().join("store.json")).unwrap();
        store
            .set("products", "p1", fields! { "stock" => 3 })
            .await
            .unwrap();

        // A plain file where the store directory should be makes every flush fail.
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"").unwrap();
        let broken = JsonFileBackend {
            path: blocker.join("store.json"),
            inner: MemoryBackend::from_collections(store.inner.snapshot().unwrap()),
        };

        assert!(broken
            .update("products", "p1", fields! { "stock" => 2 })
            .await
            .is_err());
        assert!(broken
            .set("products", "p2", fields! { "stock" => 9 })
            .await
            .is_err());
        assert!(broken.add("orders", fields! { "status" => "Pending" }).await.is_err());

        let product = broken.get("products", "p1").await.unwrap().unwrap();
        assert_eq!(product["stock"], 3);
        assert!(broken.get("products", "p2").await.unwrap().is_none());
        assert!(broken.list("orders").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileBackend::open(dir.path().join("absent.json")).unwrap();
        assert!(store.list("orders").await.unwrap().is_empty());
    }
}
