//! Knowledge collections and the storage trait that serves them.
//!
//! A collection is a labeled group of files. The router only needs three
//! things from storage: the collections a user may read, one collection by
//! id, and metadata for a set of file ids.

use crate::error::StorageError;
use crate::identity::{Identity, UserRole};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The slice of a collection shown to the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateCollection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// Full collection metadata as held by storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeCollection {
    pub id: String,

    /// Owner of the collection
    pub user_id: String,

    pub name: String,

    #[serde(default)]
    pub description: String,

    /// Member files
    #[serde(default)]
    pub data: CollectionData,

    /// Free-form host metadata, passed through untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,

    /// `None` means public: every user may read it
    #[serde(default)]
    pub access_control: Option<AccessControl>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionData {
    #[serde(default)]
    pub file_ids: Vec<String>,
}

/// Per-collection sharing rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    #[serde(default)]
    pub read: AccessList,
    #[serde(default)]
    pub write: AccessList,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessList {
    #[serde(default)]
    pub group_ids: Vec<String>,
    #[serde(default)]
    pub user_ids: Vec<String>,
}

impl AccessList {
    fn admits(&self, identity: &Identity) -> bool {
        self.user_ids.iter().any(|u| *u == identity.id)
            || identity
                .group_ids
                .iter()
                .any(|g| self.group_ids.contains(g))
    }
}

impl KnowledgeCollection {
    /// Whether `identity` may read this collection.
    ///
    /// Admins always can. Pending accounts see public collections only.
    /// Everyone else reads what they own, public collections, and
    /// collections sharing read access with the user or one of their groups.
    pub fn is_readable_by(&self, identity: &Identity) -> bool {
        if identity.is_admin() {
            return true;
        }
        if identity.role == UserRole::Pending {
            return self.access_control.is_none();
        }
        if self.user_id == identity.id {
            return true;
        }
        match &self.access_control {
            None => true,
            Some(acl) => acl.read.admits(identity),
        }
    }

    pub fn candidate(&self) -> CandidateCollection {
        CandidateCollection {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

/// Metadata of one stored file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub id: String,

    #[serde(default)]
    pub meta: FileMeta,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

/// The storage collaborator.
#[async_trait]
pub trait KnowledgeStore: Send + Sync {
    /// Backend name, for diagnostics.
    fn name(&self) -> &str;

    /// Collections `identity` may read, in storage order.
    async fn list_readable(
        &self,
        identity: &Identity,
    ) -> Result<Vec<CandidateCollection>, StorageError>;

    /// One collection by id; `Ok(None)` when it does not exist.
    async fn get_by_id(&self, id: &str) -> Result<Option<KnowledgeCollection>, StorageError>;

    /// Metadata for the given file ids, in the order given. Unknown ids are
    /// skipped.
    async fn get_file_metadata(&self, ids: &[String]) -> Result<Vec<FileMetadata>, StorageError>;
}
