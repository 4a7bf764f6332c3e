//! File-based store: a JSON catalog on disk.
//!
//! The catalog is loaded into memory when the store opens and written back
//! on every mutation. Reads never touch the disk, so a routing invocation
//! sees one consistent snapshot per lookup.
//!
//! Default location: `~/.knowroute/catalog.json`

use crate::catalog::Catalog;
use async_trait::async_trait;
use knowroute_core::error::{IdentityError, StorageError};
use knowroute_core::identity::{Identity, UserDirectory};
use knowroute_core::knowledge::{
    CandidateCollection, FileMetadata, KnowledgeCollection, KnowledgeStore,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

/// A catalog store persisted as a single JSON document.
pub struct FileCatalogStore {
    path: PathBuf,
    catalog: Arc<RwLock<Catalog>>,
}

impl FileCatalogStore {
    /// Open the catalog at `path`.
    ///
    /// A missing file yields an empty catalog (the file is created on first
    /// write). A file that exists but does not parse is an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let catalog = Self::load_from_disk(&path)?;
        debug!(
            path = %path.display(),
            collections = catalog.collections.len(),
            files = catalog.files.len(),
            users = catalog.users.len(),
            "Catalog loaded"
        );
        Ok(Self {
            path,
            catalog: Arc::new(RwLock::new(catalog)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_disk(path: &Path) -> Result<Catalog, StorageError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Catalog::default()),
            Err(e) => {
                return Err(StorageError::Load {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        };

        if content.trim().is_empty() {
            return Ok(Catalog::default());
        }

        serde_json::from_str(&content).map_err(|e| StorageError::Load {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Re-read the catalog from disk, replacing the in-memory copy.
    pub async fn reload(&self) -> Result<(), StorageError> {
        let fresh = Self::load_from_disk(&self.path)?;
        *self.catalog.write().await = fresh;
        Ok(())
    }

    /// Insert or replace a collection and persist.
    pub async fn insert_collection(
        &self,
        collection: KnowledgeCollection,
    ) -> Result<(), StorageError> {
        self.catalog.write().await.upsert_collection(collection);
        self.flush().await
    }

    /// Insert or replace a file and persist.
    pub async fn insert_file(&self, file: FileMetadata) -> Result<(), StorageError> {
        self.catalog.write().await.upsert_file(file);
        self.flush().await
    }

    /// Insert or replace a user and persist.
    pub async fn insert_user(&self, user: Identity) -> Result<(), StorageError> {
        self.catalog.write().await.upsert_user(user);
        self.flush().await
    }

    /// Write the catalog to disk as pretty JSON.
    async fn flush(&self) -> Result<(), StorageError> {
        let catalog = self.catalog.read().await;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| {
                StorageError::Backend(format!("Failed to create catalog directory: {e}"))
            })?;
        }

        let content = serde_json::to_string_pretty(&*catalog)
            .map_err(|e| StorageError::Backend(format!("Failed to serialize catalog: {e}")))?;

        std::fs::write(&self.path, content)
            .map_err(|e| StorageError::Backend(format!("Failed to write catalog file: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl KnowledgeStore for FileCatalogStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn list_readable(
        &self,
        identity: &Identity,
    ) -> Result<Vec<CandidateCollection>, StorageError> {
        Ok(self.catalog.read().await.readable_by(identity))
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<KnowledgeCollection>, StorageError> {
        Ok(self.catalog.read().await.collection(id).cloned())
    }

    async fn get_file_metadata(&self, ids: &[String]) -> Result<Vec<FileMetadata>, StorageError> {
        Ok(self.catalog.read().await.files_by_ids(ids))
    }
}

#[async_trait]
impl UserDirectory for FileCatalogStore {
    async fn resolve(&self, user_id: &str) -> Result<Identity, IdentityError> {
        self.catalog.read().await.user(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use knowroute_core::knowledge::CollectionData;

    fn collection(id: &str) -> KnowledgeCollection {
        KnowledgeCollection {
            id: id.into(),
            user_id: "u-1".into(),
            name: "Docs".into(),
            description: "Product docs".into(),
            data: CollectionData::default(),
            meta: None,
            access_control: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCatalogStore::open(dir.path().join("catalog.json")).unwrap();
        let listed = store.list_readable(&Identity::user("u-1", "")).await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn writes_persist_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("catalog.json");

        let store = FileCatalogStore::open(&path).unwrap();
        store.insert_user(Identity::user("u-1", "Ada")).await.unwrap();
        store.insert_collection(collection("kb-1")).await.unwrap();

        let reopened = FileCatalogStore::open(&path).unwrap();
        assert!(reopened.get_by_id("kb-1").await.unwrap().is_some());
        assert_eq!(reopened.resolve("u-1").await.unwrap().name, "Ada");
    }

    #[test]
    fn corrupted_file_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = FileCatalogStore::open(&path).err().unwrap();
        assert!(matches!(err, StorageError::Load { .. }));
    }

    #[tokio::test]
    async fn reload_picks_up_external_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        let store = FileCatalogStore::open(&path).unwrap();
        assert!(store.get_by_id("kb-9").await.unwrap().is_none());

        std::fs::write(
            &path,
            r#"{"collections": [{"id": "kb-9", "user_id": "u", "name": "Ops"}]}"#,
        )
        .unwrap();
        store.reload().await.unwrap();
        assert_eq!(store.get_by_id("kb-9").await.unwrap().unwrap().name, "Ops");
    }
}
