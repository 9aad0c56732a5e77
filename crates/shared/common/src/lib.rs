//! Common utilities shared across all microservices.
//!
//! This crate provides:
//! - Unified error handling for HTTP and gRPC
//! - Configuration structures
//! - Logging setup and graceful shutdown

pub mod config;
pub mod error;
pub mod logging;
pub mod shutdown;

pub use config::*;
pub use error::{AppError, AppResult, ErrorResponse};
pub use shutdown::shutdown_signal;
