//! User repository implementation backed by PostgreSQL.

use async_trait::async_trait;
use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use tracing::{debug, error, warn};
use uuid::Uuid;

use super::entities::user::{self, ActiveModel, Entity as UserEntity};
use super::error::{StorageError, StorageResult};
use domain::{RequestContext, User};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Every method checks the request context before touching the database.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// List every user in the table
    async fn list(&self, ctx: &RequestContext) -> StorageResult<Vec<User>>;

    /// Find user by ID, `NotFound` when no row matches
    async fn find_by_id(&self, ctx: &RequestContext, id: Uuid) -> StorageResult<User>;

    /// Insert a user with the identifier it carries
    async fn insert(&self, ctx: &RequestContext, user: User) -> StorageResult<User>;

    /// Overwrite login, password and role of the row with the given ID
    async fn update(&self, ctx: &RequestContext, id: Uuid, user: User) -> StorageResult<User>;

    /// Delete the row with the given ID and return what it held
    async fn delete(&self, ctx: &RequestContext, id: Uuid) -> StorageResult<User>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
}

impl UserStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn ensure_active(ctx: &RequestContext, op: &'static str) -> StorageResult<()> {
    ctx.check().map_err(|e| {
        debug!(op, reason = %e, "Request is over before reaching the database");
        StorageError::from(e)
    })
}

fn log_failure(op: &'static str, id: Option<Uuid>, err: &StorageError) {
    match err {
        StorageError::NotFound => warn!(op, user_id = ?id, "User doesn't exist"),
        StorageError::AlreadyExists => warn!(op, user_id = ?id, "User already exists"),
        StorageError::Database(e) => error!(op, user_id = ?id, error = %e, "Database error"),
        StorageError::Canceled | StorageError::DeadlineExceeded => {}
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn list(&self, ctx: &RequestContext) -> StorageResult<Vec<User>> {
        const OP: &str = "storage.users.list";
        ensure_active(ctx, OP)?;

        let models = UserEntity::find().all(&self.db).await.map_err(|e| {
            let err = StorageError::from(e);
            log_failure(OP, None, &err);
            err
        })?;

        Ok(models.into_iter().map(User::from).collect())
    }

    async fn find_by_id(&self, ctx: &RequestContext, id: Uuid) -> StorageResult<User> {
        const OP: &str = "storage.users.find_by_id";
        ensure_active(ctx, OP)?;

        let result = UserEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(StorageError::from)
            .and_then(|model| model.map(User::from).ok_or(StorageError::NotFound));

        if let Err(err) = &result {
            log_failure(OP, Some(id), err);
        }
        result
    }

    async fn insert(&self, ctx: &RequestContext, user: User) -> StorageResult<User> {
        const OP: &str = "storage.users.insert";
        ensure_active(ctx, OP)?;

        UserEntity::insert(ActiveModel::from(&user))
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| {
                let err = StorageError::from(e);
                log_failure(OP, Some(user.id), &err);
                err
            })?;

        Ok(user)
    }

    async fn update(&self, ctx: &RequestContext, id: Uuid, user: User) -> StorageResult<User> {
        const OP: &str = "storage.users.update";
        ensure_active(ctx, OP)?;

        let result = UserEntity::update_many()
            .col_expr(user::Column::Login, Expr::value(user.login.clone()))
            .col_expr(user::Column::Password, Expr::value(user.password.clone()))
            .col_expr(user::Column::Role, Expr::value(user.role.clone()))
            .filter(user::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| {
                let err = StorageError::from(e);
                log_failure(OP, Some(id), &err);
                err
            })?;

        if result.rows_affected == 0 {
            let err = StorageError::NotFound;
            log_failure(OP, Some(id), &err);
            return Err(err);
        }

        Ok(user.with_id(id))
    }

    async fn delete(&self, ctx: &RequestContext, id: Uuid) -> StorageResult<User> {
        const OP: &str = "storage.users.delete";
        ensure_active(ctx, OP)?;

        // Existence check; NotFound surfaces from here
        let existing = self.find_by_id(ctx, id).await?;

        UserEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(|e| {
                let err = StorageError::from(e);
                log_failure(OP, Some(id), &err);
                err
            })?;

        Ok(existing)
    }
}
