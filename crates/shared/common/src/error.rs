//! Unified error handling for HTTP and gRPC.
//!
//! Provides a single error type that can be converted to:
//! - Axum HTTP responses (for API gateway)
//! - Tonic gRPC status codes (for microservices)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::DomainError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tonic::Status;

/// Application error types with support for both HTTP and gRPC.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    // Resource errors
    #[error("Resource not found")]
    NotFound,

    #[error("{0} already exists")]
    AlreadyExists(String),

    // Validation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // Cancellation
    #[error("Request cancelled")]
    Canceled,

    #[error("Deadline exceeded")]
    DeadlineExceeded,

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body for HTTP
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound => "NOT_FOUND",
            AppError::AlreadyExists(_) => "ALREADY_EXISTS",
            AppError::InvalidArgument(_) => "INVALID_ARGUMENT",
            AppError::Canceled => "CANCELED",
            AppError::DeadlineExceeded => "DEADLINE_EXCEEDED",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            AppError::Canceled | AppError::DeadlineExceeded => StatusCode::REQUEST_TIMEOUT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get gRPC status code
    pub fn grpc_code(&self) -> tonic::Code {
        match self {
            AppError::NotFound => tonic::Code::NotFound,
            AppError::AlreadyExists(_) => tonic::Code::AlreadyExists,
            AppError::InvalidArgument(_) => tonic::Code::InvalidArgument,
            AppError::Canceled => tonic::Code::Cancelled,
            AppError::DeadlineExceeded => tonic::Code::DeadlineExceeded,
            AppError::Internal(_) => tonic::Code::Internal,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidArgument(msg) => msg.clone(),
            AppError::AlreadyExists(msg) => {
                // Avoid duplicating "already exists" when converted from gRPC
                if msg.ends_with("already exists") {
                    msg.clone()
                } else {
                    format!("{} already exists", msg)
                }
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }
            _ => self.to_string(),
        }
    }
}

// =============================================================================
// HTTP Response (Axum)
// =============================================================================

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// gRPC Status (Tonic)
// =============================================================================

impl From<AppError> for Status {
    fn from(err: AppError) -> Self {
        Status::new(err.grpc_code(), err.user_message())
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound(_) => AppError::NotFound,
            DomainError::AlreadyExists(entity) => AppError::AlreadyExists(entity),
            DomainError::InvalidArgument(msg) => AppError::InvalidArgument(msg),
            DomainError::Canceled => AppError::Canceled,
            DomainError::DeadlineExceeded => AppError::DeadlineExceeded,
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn already_exists(entity: impl Into<String>) -> Self {
        AppError::AlreadyExists(entity.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        AppError::InvalidArgument(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_http_statuses() {
        let cases = [
            (DomainError::not_found("User"), StatusCode::NOT_FOUND),
            (DomainError::already_exists("User"), StatusCode::CONFLICT),
            (DomainError::invalid_argument("bad id"), StatusCode::BAD_REQUEST),
            (DomainError::Canceled, StatusCode::REQUEST_TIMEOUT),
            (DomainError::DeadlineExceeded, StatusCode::REQUEST_TIMEOUT),
            (DomainError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (domain, expected) in cases {
            assert_eq!(AppError::from(domain).status(), expected);
        }
    }

    #[test]
    fn domain_errors_map_to_grpc_codes() {
        let cases = [
            (DomainError::not_found("User"), tonic::Code::NotFound),
            (DomainError::already_exists("User"), tonic::Code::AlreadyExists),
            (DomainError::invalid_argument("bad id"), tonic::Code::InvalidArgument),
            (DomainError::Canceled, tonic::Code::Cancelled),
            (DomainError::DeadlineExceeded, tonic::Code::DeadlineExceeded),
            (DomainError::internal("boom"), tonic::Code::Internal),
        ];

        for (domain, expected) in cases {
            assert_eq!(Status::from(AppError::from(domain)).code(), expected);
        }
    }

    #[test]
    fn internal_details_are_hidden() {
        let status = Status::from(AppError::internal("connection refused on 10.0.0.3"));
        assert_eq!(status.message(), "An internal error occurred");
    }

    #[test]
    fn already_exists_message_is_not_duplicated() {
        let err = AppError::already_exists("User already exists");
        assert_eq!(err.user_message(), "User already exists");

        let err = AppError::already_exists("User");
        assert_eq!(err.user_message(), "User already exists");
    }

    #[tokio::test]
    async fn http_body_carries_code_and_message() {
        let response = AppError::invalid_argument("Invalid UUID format").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body: ErrorResponse = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body.error.code, "INVALID_ARGUMENT");
        assert_eq!(body.error.message, "Invalid UUID format");
    }
}
