//! Candidate enumeration: who is asking, and which collections they may read.

use knowroute_core::error::{IdentityError, StorageError};
use knowroute_core::identity::{Identity, UserDirectory};
use knowroute_core::knowledge::{CandidateCollection, KnowledgeStore};
use std::sync::Arc;
use tracing::debug;

pub struct CandidateCatalog {
    store: Arc<dyn KnowledgeStore>,
    users: Arc<dyn UserDirectory>,
}

impl CandidateCatalog {
    pub fn new(store: Arc<dyn KnowledgeStore>, users: Arc<dyn UserDirectory>) -> Self {
        Self { store, users }
    }

    /// Turn the host-supplied user id into an identity.
    pub async fn resolve_identity(&self, user_id: Option<&str>) -> Result<Identity, IdentityError> {
        let user_id = user_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(IdentityError::Missing)?;
        self.users.resolve(user_id).await
    }

    /// Collections readable by `identity`, in storage order. May be empty.
    pub async fn list(&self, identity: &Identity) -> Result<Vec<CandidateCollection>, StorageError> {
        let candidates = self.store.list_readable(identity).await?;
        debug!(
            store = %self.store.name(),
            user_id = %identity.id,
            candidates = candidates.len(),
            "Candidates listed"
        );
        Ok(candidates)
    }
}
