//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::handlers::user_handler::UserRequest;
use common::error::{ErrorBody, ErrorResponse};
use domain::UserResponse;

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::user_handler::list_users,
        crate::handlers::user_handler::get_user,
        crate::handlers::user_handler::create_user,
        crate::handlers::user_handler::update_user,
        crate::handlers::user_handler::delete_user,
    ),
    components(
        schemas(
            UserRequest,
            UserResponse,
            ErrorResponse,
            ErrorBody,
        )
    ),
    tags(
        (name = "Users", description = "User management endpoints"),
    )
)]
pub struct ApiDoc;
