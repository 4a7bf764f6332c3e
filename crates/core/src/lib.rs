//! # KnowRoute Core
//!
//! Domain types, traits, and error definitions for the KnowRoute knowledge
//! selection pipeline. This crate has **no transport dependencies**: it
//! defines the model that the provider, storage, and router crates build on.
//!
//! ## Boundaries
//!
//! Everything the pipeline talks to but does not own is a trait here:
//! - [`Provider`]: the generative completion endpoint
//! - [`KnowledgeStore`]: collections and file metadata
//! - [`UserDirectory`]: requester identity lookup
//! - [`EventSink`]: progress notifications
//!
//! Implementations live in their respective crates, and tests swap in
//! scripted doubles.

pub mod error;
pub mod event;
pub mod identity;
pub mod knowledge;
pub mod message;
pub mod payload;
pub mod provider;

// Re-export key types at crate root for ergonomics
pub use error::{Error, IdentityError, NotifyError, ProviderError, Result, StorageError};
pub use event::{EventBus, EventSink, NullSink, StatusData, StatusEvent};
pub use identity::{Identity, UserDirectory, UserRole};
pub use knowledge::{
    AccessControl, AccessList, CandidateCollection, CollectionData, FileMeta, FileMetadata,
    KnowledgeCollection, KnowledgeStore,
};
pub use message::{Message, Role, last_user_message};
pub use payload::{AttachedCollection, Attachment, ConversationPayload, FileAttachment};
pub use provider::{Provider, ProviderRequest, ProviderResponse, Usage};
