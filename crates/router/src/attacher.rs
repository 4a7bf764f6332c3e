//! Resolves a selection into a collection attachment on the payload.

use crate::parser::SelectionResult;
use knowroute_core::error::StorageError;
use knowroute_core::identity::Identity;
use knowroute_core::knowledge::KnowledgeStore;
use knowroute_core::payload::{AttachedCollection, Attachment, ConversationPayload};
use std::sync::Arc;
use tracing::{debug, info};

/// What was attached, for status reporting and logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachedSummary {
    pub id: String,
    pub name: String,
    pub file_count: usize,
}

pub struct ResourceAttacher {
    store: Arc<dyn KnowledgeStore>,
}

impl ResourceAttacher {
    pub fn new(store: Arc<dyn KnowledgeStore>) -> Self {
        Self { store }
    }

    /// Append the selected collection to `payload.files`.
    ///
    /// Returns `Ok(None)` and leaves the payload alone when nothing was
    /// selected, the id no longer resolves, or `identity` may not read the
    /// collection. The payload is mutated only after every lookup has
    /// succeeded.
    pub async fn attach(
        &self,
        selection: &SelectionResult,
        identity: &Identity,
        payload: &mut ConversationPayload,
    ) -> Result<Option<AttachedSummary>, StorageError> {
        let Some(id) = selection.id() else {
            return Ok(None);
        };

        let Some(collection) = self.store.get_by_id(id).await? else {
            debug!(collection_id = %id, "Selected collection no longer resolves");
            return Ok(None);
        };

        if !collection.is_readable_by(identity) {
            debug!(
                collection_id = %id,
                user_id = %identity.id,
                "Selected collection is not readable by the requester"
            );
            return Ok(None);
        }

        let files = self
            .store
            .get_file_metadata(&collection.data.file_ids)
            .await?;

        let summary = AttachedSummary {
            id: collection.id.clone(),
            name: collection.name.clone(),
            file_count: files.len(),
        };

        payload
            .files
            .push(Attachment::Collection(AttachedCollection { collection, files }));

        info!(
            collection_id = %summary.id,
            files = summary.file_count,
            "Collection attached"
        );
        Ok(Some(summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use knowroute_core::knowledge::{
        AccessControl, CandidateCollection, CollectionData, FileMeta, FileMetadata,
        KnowledgeCollection,
    };
    use knowroute_core::message::Message;
    use knowroute_core::payload::FileAttachment;
    use knowroute_storage::InMemoryStore;

    async fn store() -> Arc<InMemoryStore> {
        let store = Arc::new(InMemoryStore::new());
        store
            .insert_collection(KnowledgeCollection {
                id: "kb-42".into(),
                user_id: "u-1".into(),
                name: "Docs".into(),
                description: "Product documentation".into(),
                data: CollectionData {
                    file_ids: vec!["f-2".into(), "f-1".into(), "f-gone".into()],
                },
                meta: None,
                access_control: None,
                created_at: None,
                updated_at: None,
            })
            .await;
        store
            .insert_collection(KnowledgeCollection {
                id: "kb-secret".into(),
                user_id: "u-2".into(),
                name: "Payroll".into(),
                description: "Salaries".into(),
                data: CollectionData {
                    file_ids: vec!["f-1".into()],
                },
                meta: None,
                access_control: Some(AccessControl::default()),
                created_at: None,
                updated_at: None,
            })
            .await;
        for id in ["f-1", "f-2"] {
            store
                .insert_file(FileMetadata {
                    id: id.into(),
                    meta: FileMeta {
                        name: format!("{id}.md"),
                        ..Default::default()
                    },
                    created_at: None,
                    updated_at: None,
                })
                .await;
        }
        store
    }

    fn requester() -> Identity {
        Identity::user("u-1", "Ada")
    }

    fn payload() -> ConversationPayload {
        let mut payload = ConversationPayload::new("gpt-4o-mini", vec![Message::user("docs?")]);
        payload.files.push(Attachment::File(FileAttachment {
            id: "upload-1".into(),
            name: "notes.txt".into(),
            url: None,
            extra: Default::default(),
        }));
        payload
    }

    #[tokio::test]
    async fn no_selection_is_identity() {
        let attacher = ResourceAttacher::new(store().await);
        let mut p = payload();
        let result = attacher
            .attach(&SelectionResult::NoSelection, &requester(), &mut p)
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(p, payload());
    }

    #[tokio::test]
    async fn unresolvable_id_leaves_payload_unchanged() {
        let attacher = ResourceAttacher::new(store().await);
        let mut p = payload();
        let result = attacher
            .attach(&SelectionResult::Selected("kb-missing".into()), &requester(), &mut p)
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(p, payload());
    }

    #[tokio::test]
    async fn unreadable_collection_is_not_attached() {
        let attacher = ResourceAttacher::new(store().await);
        let mut p = payload();
        let result = attacher
            .attach(&SelectionResult::Selected("kb-secret".into()), &requester(), &mut p)
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(p, payload());
    }

    #[tokio::test]
    async fn owner_and_admin_may_attach_private_collection() {
        let attacher = ResourceAttacher::new(store().await);

        let mut p = payload();
        let owner = Identity::user("u-2", "Grace");
        let summary = attacher
            .attach(&SelectionResult::Selected("kb-secret".into()), &owner, &mut p)
            .await
            .unwrap();
        assert_eq!(summary.map(|s| s.name), Some("Payroll".to_string()));

        let mut p = payload();
        let mut admin = Identity::user("u-9", "Root");
        admin.role = knowroute_core::identity::UserRole::Admin;
        let summary = attacher
            .attach(&SelectionResult::Selected("kb-secret".into()), &admin, &mut p)
            .await
            .unwrap();
        assert!(summary.is_some());
    }

    #[tokio::test]
    async fn appends_after_existing_files() {
        let attacher = ResourceAttacher::new(store().await);
        let mut p = payload();
        let summary = attacher
            .attach(&SelectionResult::Selected("kb-42".into()), &requester(), &mut p)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(
            summary,
            AttachedSummary {
                id: "kb-42".into(),
                name: "Docs".into(),
                file_count: 2,
            }
        );
        assert_eq!(p.files.len(), 2);
        assert!(matches!(&p.files[0], Attachment::File(f) if f.id == "upload-1"));

        let attached: Vec<_> = p.attached_collections().collect();
        assert_eq!(attached.len(), 1);
        assert_eq!(attached[0].collection.name, "Docs");
        let file_ids: Vec<&str> = attached[0].files.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(file_ids, vec!["f-2", "f-1"]);
        assert_eq!(p.messages, payload().messages);
        assert_eq!(p.model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn attachment_serializes_as_collection_type() {
        let attacher = ResourceAttacher::new(store().await);
        let mut p = ConversationPayload::new("m", vec![]);
        attacher
            .attach(&SelectionResult::Selected("kb-42".into()), &requester(), &mut p)
            .await
            .unwrap();

        let json = serde_json::to_value(&p).unwrap();
        let entry = &json["files"][0];
        assert_eq!(entry["type"], "collection");
        assert_eq!(entry["id"], "kb-42");
        assert_eq!(entry["files"][0]["meta"]["name"], "f-2.md");
    }

    struct BrokenFileStore;

    #[async_trait]
    impl KnowledgeStore for BrokenFileStore {
        fn name(&self) -> &str {
            "broken"
        }

        async fn list_readable(
            &self,
            _identity: &Identity,
        ) -> Result<Vec<CandidateCollection>, StorageError> {
            Ok(vec![])
        }

        async fn get_by_id(&self, id: &str) -> Result<Option<KnowledgeCollection>, StorageError> {
            Ok(Some(KnowledgeCollection {
                id: id.into(),
                user_id: "u-1".into(),
                name: "Broken".into(),
                description: String::new(),
                data: CollectionData {
                    file_ids: vec!["f-1".into()],
                },
                meta: None,
                access_control: None,
                created_at: None,
                updated_at: None,
            }))
        }

        async fn get_file_metadata(
            &self,
            _ids: &[String],
        ) -> Result<Vec<FileMetadata>, StorageError> {
            Err(StorageError::QueryFailed("file table offline".into()))
        }
    }

    #[tokio::test]
    async fn storage_failure_leaves_no_partial_attachment() {
        let attacher = ResourceAttacher::new(Arc::new(BrokenFileStore));
        let mut p = payload();
        let err = attacher
            .attach(&SelectionResult::Selected("kb-1".into()), &requester(), &mut p)
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::QueryFailed(_)));
        assert_eq!(p, payload());
    }
}
