//! User handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::{error, info, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use common::{AppError, AppResult};
use domain::{RequestContext, User, UserResponse};

use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// User payload for insert and update
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UserRequest {
    /// User identifier; ignored on update
    #[schema(example = "6f1c1f8e-5a3b-4a8e-9d1e-2b7c7f0e4a11")]
    pub id: Uuid,
    #[validate(length(min = 1, message = "login must not be empty"))]
    #[schema(example = "jdoe")]
    pub login: String,
    #[validate(length(min = 1, message = "password must not be empty"))]
    #[schema(example = "s3cret")]
    pub password: String,
    #[validate(length(min = 1, message = "role must not be empty"))]
    #[schema(example = "admin")]
    pub role: String,
}

impl From<UserRequest> for User {
    fn from(req: UserRequest) -> Self {
        User::new(req.id, req.login, req.password, req.role)
    }
}

/// Create user routes
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

fn parse_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::invalid_argument("Invalid UUID format"))
}

fn begin(state: &AppState) -> AppResult<RequestContext> {
    let ctx = state.request_context();
    ctx.check()?;
    Ok(ctx)
}

/// Log how the request ended and pass the result through.
fn finish<T>(op: &'static str, result: AppResult<T>) -> AppResult<T> {
    match &result {
        Ok(_) => info!(op, "Request handled"),
        Err(AppError::Internal(msg)) => error!(op, error = %msg, "Request failed"),
        Err(err) => warn!(op, code = err.code(), reason = %err, "Request rejected"),
    }
    result
}

/// List all users
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    responses(
        (status = 200, description = "List of all users", body = Vec<UserResponse>),
        (status = 408, description = "Request cancelled or timed out"),
        (status = 500, description = "Internal error")
    )
)]
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserResponse>>> {
    let result = async {
        let ctx = begin(&state)?;
        let users = state.user_service.list_users(&ctx).await?;
        Ok::<_, AppError>(Json(users.into_iter().map(UserResponse::from).collect()))
    }
    .await;
    finish("http.users.list", result)
}

/// Get user by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User profile", body = UserResponse),
        (status = 400, description = "Malformed ID"),
        (status = 404, description = "User not found"),
        (status = 408, description = "Request cancelled or timed out")
    )
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let result = async {
        let ctx = begin(&state)?;
        let id = parse_id(&id)?;

        let user = state.user_service.get_user(&ctx, id).await?;
        Ok::<_, AppError>(Json(UserResponse::from(user)))
    }
    .await;
    finish("http.users.get", result)
}

/// Create a user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "Users",
    request_body = UserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "User already exists"),
        (status = 408, description = "Request cancelled or timed out")
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<UserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let result = async {
        let ctx = begin(&state)?;

        let user = state.user_service.insert_user(&ctx, payload.into()).await?;
        Ok::<_, AppError>((StatusCode::CREATED, Json(UserResponse::from(user))))
    }
    .await;
    finish("http.users.create", result)
}

/// Replace login, password and role of a user
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    request_body = UserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "User not found"),
        (status = 408, description = "Request cancelled or timed out")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<UserRequest>,
) -> AppResult<Json<UserResponse>> {
    let result = async {
        let ctx = begin(&state)?;
        let id = parse_id(&id)?;

        let user = User::from(payload).with_id(id);
        let user = state.user_service.update_user(&ctx, id, user).await?;
        Ok::<_, AppError>(Json(UserResponse::from(user)))
    }
    .await;
    finish("http.users.update", result)
}

/// Delete a user and return it
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    tag = "Users",
    params(
        ("id" = Uuid, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User deleted", body = UserResponse),
        (status = 400, description = "Malformed ID"),
        (status = 404, description = "User not found"),
        (status = 408, description = "Request cancelled or timed out")
    )
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let result = async {
        let ctx = begin(&state)?;
        let id = parse_id(&id)?;

        let user = state.user_service.delete_user(&ctx, id).await?;
        Ok::<_, AppError>(Json(UserResponse::from(user)))
    }
    .await;
    finish("http.users.delete", result)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use common::ErrorResponse;
    use domain::DomainError;

    use domain::CancellationToken;
    use tracing_test::traced_test;

    use crate::config::GatewayConfig;
    use crate::routes::create_router;
    use crate::service::MockUserService;

    use super::*;

    fn app(service: MockUserService) -> Router {
        create_router(AppState::new(Arc::new(service), GatewayConfig::default()))
    }

    fn user(id: Uuid) -> User {
        User::new(id, "jdoe", "s3cret", "admin")
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn list_returns_users_without_passwords() {
        let mut service = MockUserService::new();
        service
            .expect_list_users()
            .returning(|_| Ok(vec![user(Uuid::new_v4())]));

        let response = app(service)
            .oneshot(empty_request(Method::GET, "/api/v1/users"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = body_json(response).await;
        assert_eq!(body[0]["login"], "jdoe");
        assert!(body[0].get("password").is_none());
    }

    #[tokio::test]
    async fn get_with_bad_uuid_is_bad_request() {
        let response = app(MockUserService::new())
            .oneshot(empty_request(Method::GET, "/api/v1/users/not-a-uuid"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = body_json(response).await;
        assert_eq!(body.error.code, "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn get_missing_user_is_not_found() {
        let mut service = MockUserService::new();
        service
            .expect_get_user()
            .returning(|_, _| Err(DomainError::not_found("User")));

        let uri = format!("/api/v1/users/{}", Uuid::new_v4());
        let response = app(service)
            .oneshot(empty_request(Method::GET, &uri))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_returns_created() {
        let id = Uuid::new_v4();
        let mut service = MockUserService::new();
        service
            .expect_insert_user()
            .withf(move |_, u| u.id == id && u.password == "s3cret")
            .returning(|_, u| Ok(u));

        let response = app(service)
            .oneshot(json_request(
                Method::POST,
                "/api/v1/users",
                json!({"id": id, "login": "jdoe", "password": "s3cret", "role": "admin"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let body: UserResponse = body_json(response).await;
        assert_eq!(body.id, id);
    }

    #[tokio::test]
    async fn create_duplicate_is_conflict() {
        let mut service = MockUserService::new();
        service
            .expect_insert_user()
            .returning(|_, _| Err(DomainError::already_exists("User")));

        let response = app(service)
            .oneshot(json_request(
                Method::POST,
                "/api/v1/users",
                json!({"id": Uuid::new_v4(), "login": "jdoe", "password": "x", "role": "user"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn create_with_empty_login_is_bad_request() {
        let response = app(MockUserService::new())
            .oneshot(json_request(
                Method::POST,
                "/api/v1/users",
                json!({"id": Uuid::new_v4(), "login": "", "password": "x", "role": "user"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = body_json(response).await;
        assert_eq!(body.error.message, "login must not be empty");
    }

    #[tokio::test]
    async fn create_with_missing_field_is_bad_request() {
        let response = app(MockUserService::new())
            .oneshot(json_request(
                Method::POST,
                "/api/v1/users",
                json!({"id": Uuid::new_v4(), "login": "jdoe"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_keeps_path_id() {
        let path_id = Uuid::new_v4();
        let mut service = MockUserService::new();
        service
            .expect_update_user()
            .withf(move |_, id, u| *id == path_id && u.id == path_id)
            .returning(|_, _, u| Ok(u));

        let uri = format!("/api/v1/users/{}", path_id);
        let response = app(service)
            .oneshot(json_request(
                Method::PUT,
                &uri,
                json!({"id": Uuid::new_v4(), "login": "new", "password": "p", "role": "user"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: UserResponse = body_json(response).await;
        assert_eq!(body.id, path_id);
        assert_eq!(body.login, "new");
    }

    #[tokio::test]
    async fn delete_returns_removed_user() {
        let id = Uuid::new_v4();
        let mut service = MockUserService::new();
        service
            .expect_delete_user()
            .returning(|_, id| Ok(user(id)));

        let uri = format!("/api/v1/users/{}", id);
        let response = app(service)
            .oneshot(empty_request(Method::DELETE, &uri))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: UserResponse = body_json(response).await;
        assert_eq!(body.id, id);
    }

    #[tokio::test]
    async fn delete_missing_user_is_not_found() {
        let mut service = MockUserService::new();
        service
            .expect_delete_user()
            .returning(|_, _| Err(DomainError::not_found("User")));

        let uri = format!("/api/v1/users/{}", Uuid::new_v4());
        let response = app(service)
            .oneshot(empty_request(Method::DELETE, &uri))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn cancellation_is_request_timeout() {
        let mut service = MockUserService::new();
        service
            .expect_list_users()
            .returning(|_| Err(DomainError::Canceled));

        let response = app(service)
            .oneshot(empty_request(Method::GET, "/api/v1/users"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[tokio::test]
    async fn expired_budget_skips_service() {
        let mut config = GatewayConfig::default();
        config.user_service.request_timeout_ms = Some(0);
        // No expectations: reaching the service would panic
        let app = create_router(AppState::new(Arc::new(MockUserService::new()), config));

        let response = app
            .oneshot(empty_request(Method::GET, "/api/v1/users"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        let body: ErrorResponse = body_json(response).await;
        assert_eq!(body.error.code, "DEADLINE_EXCEEDED");
    }

    #[tokio::test]
    async fn internal_error_is_masked() {
        let mut service = MockUserService::new();
        service
            .expect_list_users()
            .returning(|_| Err(DomainError::internal("dial tcp 10.0.0.7:50052")));

        let response = app(service)
            .oneshot(empty_request(Method::GET, "/api/v1/users"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: ErrorResponse = body_json(response).await;
        assert_eq!(body.error.message, "An internal error occurred");
    }

    #[tokio::test]
    async fn shutdown_cancels_before_service_call() {
        let shutdown = CancellationToken::new();
        let state = AppState::new(Arc::new(MockUserService::new()), GatewayConfig::default())
            .with_shutdown(shutdown.clone());
        shutdown.cancel();

        let uri = format!("/api/v1/users/{}", Uuid::new_v4());
        let response = create_router(state)
            .oneshot(empty_request(Method::DELETE, &uri))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
        let body: ErrorResponse = body_json(response).await;
        assert_eq!(body.error.code, "CANCELED");
    }

    #[tokio::test]
    #[traced_test]
    async fn outcomes_are_logged() {
        let mut service = MockUserService::new();
        service
            .expect_get_user()
            .returning(|_, _| Err(DomainError::not_found("User")));
        service
            .expect_list_users()
            .returning(|_| Err(DomainError::internal("connection reset")));
        service
            .expect_delete_user()
            .returning(|_, id| Ok(user(id)));
        let app = app(service);

        let uri = format!("/api/v1/users/{}", Uuid::new_v4());
        app.clone()
            .oneshot(empty_request(Method::GET, &uri))
            .await
            .unwrap();
        app.clone()
            .oneshot(empty_request(Method::GET, "/api/v1/users"))
            .await
            .unwrap();
        app.oneshot(empty_request(Method::DELETE, &uri))
            .await
            .unwrap();

        assert!(logs_contain("Request rejected"));
        assert!(logs_contain("NOT_FOUND"));
        assert!(logs_contain("Request failed"));
        assert!(logs_contain("connection reset"));
        assert!(logs_contain("Request handled"));
    }
}
