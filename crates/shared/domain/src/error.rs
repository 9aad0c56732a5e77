//! Domain-level errors.
//!
//! These are the sentinel errors every domain service speaks, whatever sits
//! underneath it (a database on the user-service side, a gRPC client on the
//! gateway side). They are matched by variant, never by message text.

use thiserror::Error;

/// Domain-specific errors returned by user operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Entity already exists (conflict)
    #[error("{0} already exists")]
    AlreadyExists(String),

    /// Malformed identifier or payload
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The request was cancelled by its caller
    #[error("Request cancelled")]
    Canceled,

    /// The request deadline elapsed
    #[error("Deadline exceeded")]
    DeadlineExceeded,

    /// Internal domain error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>) -> Self {
        DomainError::NotFound(entity.into())
    }

    /// Create an already-exists error
    pub fn already_exists(entity: impl Into<String>) -> Self {
        DomainError::AlreadyExists(entity.into())
    }

    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        DomainError::InvalidArgument(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        DomainError::Internal(msg.into())
    }
}

/// Result type alias for domain operations
pub type DomainResult<T> = Result<T, DomainError>;
