//! Gateway-side user service.
//!
//! Same operation set as the user service itself, but backed by the gRPC
//! client instead of a database. Client sentinels are folded back into
//! [`DomainError`] so the HTTP layer only deals with one error set.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use domain::{DomainError, DomainResult, RequestContext, User};

use crate::clients::{ClientError, ClientResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Remote user storage, reached over gRPC.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserStorage: Send + Sync {
    async fn list(&self, ctx: &RequestContext) -> ClientResult<Vec<User>>;

    async fn find_by_id(&self, ctx: &RequestContext, id: Uuid) -> ClientResult<User>;

    async fn insert(&self, ctx: &RequestContext, user: User) -> ClientResult<User>;

    async fn update(&self, ctx: &RequestContext, id: Uuid, user: User) -> ClientResult<User>;

    async fn delete(&self, ctx: &RequestContext, id: Uuid) -> ClientResult<User>;
}

/// User operations exposed to HTTP handlers.
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

/// [`UserService`] backed by a [`UserStorage`].
pub struct UsersService {
    storage: Arc<dyn UserStorage>,
}

impl UsersService {
    pub fn new(storage: Arc<dyn UserStorage>) -> Self {
        Self { storage }
    }
}

fn ensure_active(ctx: &RequestContext, op: &'static str) -> DomainResult<()> {
    ctx.check().inspect_err(|e| debug!(op, reason = %e, "Context cancelled"))
}

fn translate(op: &'static str, id: Option<Uuid>, err: ClientError) -> DomainError {
    match err {
        ClientError::NotFound => {
            warn!(op, user_id = ?id, "User not found");
            DomainError::not_found("User")
        }
        ClientError::AlreadyExists => {
            warn!(op, user_id = ?id, "User already exists");
            DomainError::already_exists("User")
        }
        ClientError::InvalidArgument(msg) => {
            warn!(op, user_id = ?id, reason = %msg, "Rejected by user service");
            DomainError::InvalidArgument(msg)
        }
        ClientError::Canceled => DomainError::Canceled,
        ClientError::DeadlineExceeded => DomainError::DeadlineExceeded,
        ClientError::Internal(msg) => {
            error!(op, user_id = ?id, error = %msg, "User service call failed");
            DomainError::Internal(msg)
        }
    }
}

#[async_trait]
impl UserService for UsersService {
    async fn list_users(&self, ctx: &RequestContext) -> DomainResult<Vec<User>> {
        const OP: &str = "gateway.users.list_users";
        ensure_active(ctx, OP)?;

        let users = self
            .storage
            .list(ctx)
            .await
            .map_err(|e| translate(OP, None, e))?;

        info!(count = users.len(), "Users fetched successfully");
        Ok(users)
    }

    async fn get_user(&self, ctx: &RequestContext, id: Uuid) -> DomainResult<User> {
        const OP: &str = "gateway.users.get_user";
        ensure_active(ctx, OP)?;

        let user = self
            .storage
            .find_by_id(ctx, id)
            .await
            .map_err(|e| translate(OP, Some(id), e))?;

        info!(user_id = %user.id, "User fetched successfully");
        Ok(user)
    }

    async fn insert_user(&self, ctx: &RequestContext, user: User) -> DomainResult<User> {
        const OP: &str = "gateway.users.insert_user";
        ensure_active(ctx, OP)?;

        let id = user.id;
        let inserted = self
            .storage
            .insert(ctx, user)
            .await
            .map_err(|e| translate(OP, Some(id), e))?;

        info!(user_id = %inserted.id, "User inserted successfully");
        Ok(inserted)
    }

    async fn update_user(&self, ctx: &RequestContext, id: Uuid, user: User) -> DomainResult<User> {
        const OP: &str = "gateway.users.update_user";
        ensure_active(ctx, OP)?;

        let updated = self
            .storage
            .update(ctx, id, user)
            .await
            .map_err(|e| translate(OP, Some(id), e))?;

        info!(user_id = %updated.id, "User updated successfully");
        Ok(updated)
    }

    async fn delete_user(&self, ctx: &RequestContext, id: Uuid) -> DomainResult<User> {
        const OP: &str = "gateway.users.delete_user";
        ensure_active(ctx, OP)?;

        let deleted = self
            .storage
            .delete(ctx, id)
            .await
            .map_err(|e| translate(OP, Some(id), e))?;

        info!(user_id = %deleted.id, "User deleted successfully");
        Ok(deleted)
    }
}
