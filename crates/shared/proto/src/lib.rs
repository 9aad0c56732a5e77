//! gRPC protocol buffer definitions.
//!
//! This crate contains the generated gRPC service definitions for:
//! - UsersManager: User management (list, get, insert, update, delete)

/// Users manager service definitions.
pub mod users_manager {
    tonic::include_proto!("users_manager");
}

// Re-export commonly used items
pub use users_manager::users_manager_client::UsersManagerClient;
pub use users_manager::users_manager_server::{UsersManager, UsersManagerServer};
