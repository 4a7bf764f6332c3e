//! In-memory backend: useful for testing and embedding in a host process.

use crate::catalog::Catalog;
use async_trait::async_trait;
use knowroute_core::error::{IdentityError, StorageError};
use knowroute_core::identity::{Identity, UserDirectory};
use knowroute_core::knowledge::{
    CandidateCollection, FileMetadata, KnowledgeCollection, KnowledgeStore,
};
use std::sync::Arc;
use tokio::sync::RwLock;

/// A store that keeps the whole catalog in memory.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    catalog: Arc<RwLock<Catalog>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_catalog(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(RwLock::new(catalog)),
        }
    }

    pub async fn insert_collection(&self, collection: KnowledgeCollection) {
        self.catalog.write().await.upsert_collection(collection);
    }

    pub async fn insert_file(&self, file: FileMetadata) {
        self.catalog.write().await.upsert_file(file);
    }

    pub async fn insert_user(&self, user: Identity) {
        self.catalog.write().await.upsert_user(user);
    }

    /// Remove a collection; returns whether it existed.
    pub async fn remove_collection(&self, id: &str) -> bool {
        let mut catalog = self.catalog.write().await;
        let len_before = catalog.collections.len();
        catalog.collections.retain(|c| c.id != id);
        catalog.collections.len() < len_before
    }

    pub async fn snapshot(&self) -> Catalog {
        self.catalog.read().await.clone()
    }
}

#[async_trait]
impl KnowledgeStore for InMemoryStore {
    fn name(&self) -> &str {
        "in_memory"
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
impl UserDirectory for InMemoryStore {
    async fn resolve(&self, user_id: &str) -> Result<Identity, IdentityError> {
        self.catalog.read().await.user(user_id)
    }
}
