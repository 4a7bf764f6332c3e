//! Error types for the KnowRoute domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each boundary collaborator has its own error enum.

use thiserror::Error;

/// The top-level error type for KnowRoute operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Storage errors ---
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    // --- Identity errors ---
    #[error("Identity error: {0}")]
    Identity(#[from] IdentityError),

    // --- Notification errors ---
    #[error("Notification error: {0}")]
    Notify(#[from] NotifyError),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Boundary errors ---

/// Failures of the generative completion call.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Malformed completion envelope: {0}")]
    MalformedResponse(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures of the knowledge storage collaborator.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Catalog file could not be loaded from {path}: {reason}")]
    Load { path: String, reason: String },
}

/// Failures to establish who is asking.
#[derive(Debug, Clone, Error)]
pub enum IdentityError {
    #[error("No requesting user supplied")]
    Missing,

    #[error("Unknown user: {0}")]
    Unknown(String),

    #[error("User directory unavailable: {0}")]
    Unavailable(String),
}

/// Failures to deliver a status notification.
#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    #[error("Notification channel closed")]
    Closed,

    #[error("Notification delivery failed: {0}")]
    DeliveryFailed(String),
}
