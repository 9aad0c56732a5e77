//! Service layer.

mod user_service;

pub use user_service::{UserService, UserStorage, UsersService};

#[cfg(any(test, feature = "test-utils"))]
pub use user_service::{MockUserService, MockUserStorage};
