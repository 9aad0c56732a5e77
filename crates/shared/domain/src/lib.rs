//! Domain layer - Core business entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! Both the user-service and the gateway build their services on these types.

pub mod context;
pub mod error;
pub mod user;

pub use context::RequestContext;
pub use tokio_util::sync::CancellationToken;
pub use error::{DomainError, DomainResult};
pub use user::{User, UserResponse};
