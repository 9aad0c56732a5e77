//! User service - Handles user-related business logic.
//!
//! Sits between the gRPC adapter and the repository. Storage sentinels are
//! re-mapped into [`DomainError`] here so nothing above this layer ever sees
//! a database type.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use domain::{DomainError, DomainResult, RequestContext, User};

use crate::repository::{StorageError, UserRepository};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User service trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserService: Send + Sync {
    /// List all users
    async fn list_users(&self, ctx: &RequestContext) -> DomainResult<Vec<User>>;

    /// Get user by ID
    async fn get_user(&self, ctx: &RequestContext, id: Uuid) -> DomainResult<User>;

    /// Insert a new user
    async fn insert_user(&self, ctx: &RequestContext, user: User) -> DomainResult<User>;

    /// Replace login, password and role of an existing user
    async fn update_user(&self, ctx: &RequestContext, id: Uuid, user: User) -> DomainResult<User>;

    /// Delete user and return the removed record
    async fn delete_user(&self, ctx: &RequestContext, id: Uuid) -> DomainResult<User>;
}

/// Concrete implementation of UserService using repository.
pub struct UserManager {
    repo: Arc<dyn UserRepository>,
}

impl UserManager {
    /// Create new user service instance with repository
    pub fn new(repo: Arc<dyn UserRepository>) -> Self {
        Self { repo }
    }
}

fn ensure_active(ctx: &RequestContext, op: &'static str) -> DomainResult<()> {
    ctx.check().inspect_err(|e| debug!(op, reason = %e, "Context cancelled"))
}

/// Translate a storage failure into the domain sentinel set.
fn translate(op: &'static str, id: Option<Uuid>, err: StorageError) -> DomainError {
    match err {
        StorageError::NotFound => {
            warn!(op, user_id = ?id, "User not found");
            DomainError::not_found("User")
        }
        StorageError::AlreadyExists => {
            warn!(op, user_id = ?id, "User already exists");
            DomainError::already_exists("User")
        }
        StorageError::Canceled => DomainError::Canceled,
        StorageError::DeadlineExceeded => DomainError::DeadlineExceeded,
        StorageError::Database(e) => {
            error!(op, user_id = ?id, error = %e, "Storage failure");
            DomainError::internal(e.to_string())
        }
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn list_users(&self, ctx: &RequestContext) -> DomainResult<Vec<User>> {
        const OP: &str = "service.users.list_users";
        ensure_active(ctx, OP)?;

        let users = self
            .repo
            .list(ctx)
            .await
            .map_err(|e| translate(OP, None, e))?;

        info!(count = users.len(), "Users fetched successfully");
        Ok(users)
    }

    async fn get_user(&self, ctx: &RequestContext, id: Uuid) -> DomainResult<User> {
        const OP: &str = "service.users.get_user";
        ensure_active(ctx, OP)?;

        let user = self
            .repo
            .find_by_id(ctx, id)
            .await
            .map_err(|e| translate(OP, Some(id), e))?;

        info!(user_id = %user.id, "User fetched successfully");
        Ok(user)
    }

    async fn insert_user(&self, ctx: &RequestContext, user: User) -> DomainResult<User> {
        const OP: &str = "service.users.insert_user";
        ensure_active(ctx, OP)?;

        let id = user.id;
        let inserted = self
            .repo
            .insert(ctx, user)
            .await
            .map_err(|e| translate(OP, Some(id), e))?;

        info!(user_id = %inserted.id, "User inserted successfully");
        Ok(inserted)
    }

    async fn update_user(&self, ctx: &RequestContext, id: Uuid, user: User) -> DomainResult<User> {
        const OP: &str = "service.users.update_user";
        ensure_active(ctx, OP)?;

        let updated = self
            .repo
            .update(ctx, id, user)
            .await
            .map_err(|e| translate(OP, Some(id), e))?;

        info!(user_id = %updated.id, "User updated successfully");
        Ok(updated)
    }

    async fn delete_user(&self, ctx: &RequestContext, id: Uuid) -> DomainResult<User> {
        const OP: &str = "service.users.delete_user";
        ensure_active(ctx, OP)?;

        let deleted = self
            .repo
            .delete(ctx, id)
            .await
            .map_err(|e| translate(OP, Some(id), e))?;

        info!(user_id = %deleted.id, "User deleted successfully");
        Ok(deleted)
    }
}
