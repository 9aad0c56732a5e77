//! Repository layer for data access.

pub mod entities;
mod error;
mod user_repository;

pub use error::{StorageError, StorageResult};
pub use user_repository::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
