//! User domain entity and related types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User domain entity.
///
/// The password is kept as given; the storage layer persists it verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub login: String,
    pub password: String,
    pub role: String,
}

impl User {
    /// Create a new user.
    pub fn new(
        id: Uuid,
        login: impl Into<String>,
        password: impl Into<String>,
        role: impl Into<String>,
    ) -> Self {
        Self {
            id,
            login: login.into(),
            password: password.into(),
            role: role.into(),
        }
    }

    /// Replace the identifier, keeping every other field.
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = id;
        self
    }
}

/// User response (safe to return to client)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UserResponse {
    /// Unique user identifier
    pub id: Uuid,
    /// Login name
    pub login: String,
    /// User role
    pub role: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            login: user.login,
            role: user.role,
        }
    }
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            login: user.login.clone(),
            role: user.role.clone(),
        }
    }
}
