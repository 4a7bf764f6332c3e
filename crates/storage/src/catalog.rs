//! The catalog document shared by every backend.
//!
//! A catalog is a plain JSON document:
//!
//! ```json
//! {
//!   "users":       [{ "id": "u-1", "name": "Ada", "role": "user", "group_ids": ["eng"] }],
//!   "collections": [{ "id": "kb-1", "user_id": "u-1", "name": "Docs", "data": { "file_ids": ["f-1"] } }],
//!   "files":       [{ "id": "f-1", "meta": { "name": "guide.pdf" } }]
//! }
//! ```

use knowroute_core::error::IdentityError;
use knowroute_core::identity::Identity;
use knowroute_core::knowledge::{CandidateCollection, FileMetadata, KnowledgeCollection};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub users: Vec<Identity>,

    #[serde(default)]
    pub collections: Vec<KnowledgeCollection>,

    #[serde(default)]
    pub files: Vec<FileMetadata>,
}

impl Catalog {
    /// Candidates readable by `identity`, in catalog order.
    pub fn readable_by(&self, identity: &Identity) -> Vec<CandidateCollection> {
        self.collections
            .iter()
            .filter(|c| c.is_readable_by(identity))
            .map(KnowledgeCollection::candidate)
            .collect()
    }

    pub fn collection(&self, id: &str) -> Option<&KnowledgeCollection> {
        self.collections.iter().find(|c| c.id == id)
    }

    /// File metadata in the order of `ids`; unknown ids are skipped.
    pub fn files_by_ids(&self, ids: &[String]) -> Vec<FileMetadata> {
        ids.iter()
            .filter_map(|id| self.files.iter().find(|f| f.id == *id))
            .cloned()
            .collect()
    }

    pub fn user(&self, user_id: &str) -> Result<Identity, IdentityError> {
        if user_id.trim().is_empty() {
            return Err(IdentityError::Missing);
        }
        self.users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| IdentityError::Unknown(user_id.to_string()))
    }

    /// Insert or replace a collection by id.
    pub fn upsert_collection(&mut self, collection: KnowledgeCollection) {
        match self.collections.iter_mut().find(|c| c.id == collection.id) {
            Some(existing) => *existing = collection,
            None => self.collections.push(collection),
        }
    }

    /// Insert or replace a file by id.
    pub fn upsert_file(&mut self, file: FileMetadata) {
        match self.files.iter_mut().find(|f| f.id == file.id) {
            Some(existing) => *existing = file,
            None => self.files.push(file),
        }
    }

    /// Insert or replace a user by id.
    pub fn upsert_user(&mut self, user: Identity) {
        match self.users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user,
            None => self.users.push(user),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Catalog {
        serde_json::from_str(
            r#"{
                "users": [{"id": "u-1", "name": "Ada"}, {"id": "u-2", "name": "Bob", "group_ids": ["hr"]}],
                "collections": [
                    {"id": "kb-1", "user_id": "u-1", "name": "Docs", "description": "Product docs",
                     "data": {"file_ids": ["f-2", "f-missing", "f-1"]}},
                    {"id": "kb-2", "user_id": "u-9", "name": "HR", "description": "Policies",
                     "access_control": {"read": {"group_ids": ["hr"], "user_ids": []}}},
                    {"id": "kb-3", "user_id": "u-9", "name": "Secret", "access_control": {}}
                ],
                "files": [
                    {"id": "f-1", "meta": {"name": "a.md"}},
                    {"id": "f-2", "meta": {"name": "b.md"}}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn readable_filters_by_access() {
        let catalog = sample();
        let ada = catalog.user("u-1").unwrap();
        let bob = catalog.user("u-2").unwrap();

        let ids = |v: Vec<CandidateCollection>| v.into_iter().map(|c| c.id).collect::<Vec<_>>();
        assert_eq!(ids(catalog.readable_by(&ada)), vec!["kb-1"]);
        assert_eq!(ids(catalog.readable_by(&bob)), vec!["kb-1", "kb-2"]);
    }

    #[test]
    fn files_follow_requested_order_and_skip_unknown() {
        let catalog = sample();
        let ids = catalog.collection("kb-1").unwrap().data.file_ids.clone();
        let files = catalog.files_by_ids(&ids);
        let names: Vec<_> = files.iter().map(|f| f.meta.name.as_str()).collect();
        assert_eq!(names, vec!["b.md", "a.md"]);
    }

    #[test]
    fn user_lookup_errors() {
        let catalog = sample();
        assert!(matches!(catalog.user(""), Err(IdentityError::Missing)));
        assert!(matches!(catalog.user("nobody"), Err(IdentityError::Unknown(_))));
    }

    #[test]
    fn upsert_replaces_by_id() {
        let mut catalog = sample();
        let mut docs = catalog.collection("kb-1").unwrap().clone();
        docs.name = "Docs v2".into();
        catalog.upsert_collection(docs);
        assert_eq!(catalog.collections.len(), 3);
        assert_eq!(catalog.collection("kb-1").unwrap().name, "Docs v2");
    }
}
