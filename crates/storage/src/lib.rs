//! Knowledge storage implementations for KnowRoute.
//!
//! Both backends serve collections, file metadata, and users from memory;
//! the file backend seeds itself from a JSON catalog on disk.

pub mod catalog;
pub mod file_backend;
pub mod in_memory;

pub use catalog::Catalog;
pub use file_backend::FileCatalogStore;
pub use in_memory::InMemoryStore;
