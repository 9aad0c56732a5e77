//! Storage-level errors.
//!
//! Only two SQL outcomes are given their own kind: a missing row and a
//! unique-constraint violation. Every other database error is carried
//! through untouched.

use domain::DomainError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("record not found")]
    NotFound,

    #[error("record already exists")]
    AlreadyExists,

    #[error("request cancelled")]
    Canceled,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for StorageError {
    fn from(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
            return StorageError::AlreadyExists;
        }
        match err {
            DbErr::RecordNotFound(_) => StorageError::NotFound,
            other => StorageError::Database(other),
        }
    }
}

/// Cancellation reported by [`domain::RequestContext::check`].
impl From<DomainError> for StorageError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::DeadlineExceeded => StorageError::DeadlineExceeded,
            DomainError::Canceled => StorageError::Canceled,
            other => StorageError::Database(DbErr::Custom(other.to_string())),
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
