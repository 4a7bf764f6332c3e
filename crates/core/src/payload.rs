//! The conversation payload handed in by the host and handed back after
//! routing.
//!
//! The router reads `model` and `messages` and only ever appends to `files`.

use crate::knowledge::{FileMetadata, KnowledgeCollection};
use crate::message::Message;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A chat request as seen by the router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationPayload {
    /// Model the host will answer with; also the default classifier model
    pub model: String,

    /// Conversation so far, most recent last
    pub messages: Vec<Message>,

    /// Resources attached to this turn; `null` reads as empty
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub files: Vec<Attachment>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,

    /// Host fields this crate does not interpret, handed back as received
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ConversationPayload {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            files: Vec::new(),
            stream: None,
            extra: serde_json::Map::new(),
        }
    }

    /// Collections attached so far, in attachment order.
    pub fn attached_collections(&self) -> impl Iterator<Item = &AttachedCollection> {
        self.files.iter().filter_map(|a| match a {
            Attachment::Collection(c) => Some(c),
            Attachment::File(_) | Attachment::Other(_) => None,
        })
    }
}

/// One entry of the payload's `files` list, tagged by `type`.
///
/// Entries of any other type, or that do not fit their type's shape, are
/// carried through untouched as [`Attachment::Other`].
#[derive(Debug, Clone, PartialEq)]
pub enum Attachment {
    /// A whole knowledge collection with its files
    Collection(AttachedCollection),
    /// A single file uploaded by the user
    File(FileAttachment),
    /// Anything else the host attached
    Other(Value),
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum KnownAttachment {
    Collection(AttachedCollection),
    File(FileAttachment),
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum KnownAttachmentRef<'a> {
    Collection(&'a AttachedCollection),
    File(&'a FileAttachment),
}

impl Attachment {
    fn from_value(value: Value) -> Self {
        let known = matches!(value["type"].as_str(), Some("collection" | "file"));
        if known && let Ok(attachment) = serde_json::from_value::<KnownAttachment>(value.clone()) {
            return match attachment {
                KnownAttachment::Collection(c) => Self::Collection(c),
                KnownAttachment::File(f) => Self::File(f),
            };
        }
        Self::Other(value)
    }
}

impl Serialize for Attachment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Collection(c) => KnownAttachmentRef::Collection(c).serialize(serializer),
            Self::File(f) => KnownAttachmentRef::File(f).serialize(serializer),
            Self::Other(value) => value.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Attachment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Self::from_value)
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Attachment>, D::Error> {
    Ok(Option::<Vec<Attachment>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A knowledge collection resolved for attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachedCollection {
    #[serde(flatten)]
    pub collection: KnowledgeCollection,

    /// Metadata of every member file that still exists
    #[serde(default)]
    pub files: Vec<FileMetadata>,
}

/// A plain file attachment supplied by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAttachment {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Host fields this crate does not interpret
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}
