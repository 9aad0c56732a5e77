//! gRPC implementation of the `UsersManager` service.

use std::sync::Arc;

use tonic::{Request, Response, Status};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use common::AppError;
use domain::{CancellationToken, DomainError, RequestContext, User};
use proto::users_manager::{
    self as pb, DeleteRequest, DeleteResponse, GetUserByIdRequest, GetUserByIdResponse,
    GetUsersRequest, GetUsersResponse, InsertRequest, InsertResponse, UpdateRequest,
    UpdateResponse,
};
use proto::UsersManager;

use super::context::request_context;
use crate::service::UserService;

/// gRPC service wrapper for UserService.
pub struct UserGrpcService {
    service: Arc<dyn UserService>,
    shutdown: CancellationToken,
}

impl UserGrpcService {
    /// Create a new gRPC service wrapper.
    pub fn new(service: Arc<dyn UserService>) -> Self {
        Self {
            service,
            shutdown: CancellationToken::new(),
        }
    }

    /// Cancel every in-flight request context once `shutdown` is cancelled.
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    fn begin<T>(&self, op: &'static str, request: &Request<T>) -> Result<RequestContext, Status> {
        let ctx = request_context(request, &self.shutdown);
        ctx.check().map_err(|e| fail(op, None, e))?;
        debug!(op, "Request received");
        Ok(ctx)
    }
}

#[tonic::async_trait]
impl UsersManager for UserGrpcService {
    async fn get_users(
        &self,
        request: Request<GetUsersRequest>,
    ) -> Result<Response<GetUsersResponse>, Status> {
        const OP: &str = "grpc.users.get_users";
        let ctx = self.begin(OP, &request)?;

        let users = self
            .service
            .list_users(&ctx)
            .await
            .map_err(|e| fail(OP, None, e))?;

        info!(op = OP, count = users.len(), "Users sent");
        Ok(Response::new(GetUsersResponse {
            users: users.iter().map(user_to_proto).collect(),
        }))
    }

    async fn get_user_by_id(
        &self,
        request: Request<GetUserByIdRequest>,
    ) -> Result<Response<GetUserByIdResponse>, Status> {
        const OP: &str = "grpc.users.get_user_by_id";
        let ctx = self.begin(OP, &request)?;
        let id = parse_uuid(OP, &request.get_ref().id)?;

        let user = self
            .service
            .get_user(&ctx, id)
            .await
            .map_err(|e| fail(OP, Some(id), e))?;

        info!(op = OP, user_id = %id, "User sent");
        Ok(Response::new(GetUserByIdResponse {
            user: Some(user_to_proto(&user)),
        }))
    }

    async fn insert(
        &self,
        request: Request<InsertRequest>,
    ) -> Result<Response<InsertResponse>, Status> {
        const OP: &str = "grpc.users.insert";
        let ctx = self.begin(OP, &request)?;
        let user = proto_to_user(OP, request.into_inner().user)?;
        let id = user.id;

        let user = self
            .service
            .insert_user(&ctx, user)
            .await
            .map_err(|e| fail(OP, Some(id), e))?;

        info!(op = OP, user_id = %id, "User inserted");
        Ok(Response::new(InsertResponse {
            user: Some(user_to_proto(&user)),
        }))
    }

    async fn update(
        &self,
        request: Request<UpdateRequest>,
    ) -> Result<Response<UpdateResponse>, Status> {
        const OP: &str = "grpc.users.update";
        let ctx = self.begin(OP, &request)?;
        let req = request.into_inner();
        let id = parse_uuid(OP, &req.id)?;
        // The payload id is ignored; the request id selects the row
        let payload = req.user.ok_or_else(|| missing_user(OP))?;
        let user = User::new(id, payload.login, payload.password, payload.role);

        let user = self
            .service
            .update_user(&ctx, id, user)
            .await
            .map_err(|e| fail(OP, Some(id), e))?;

        info!(op = OP, user_id = %id, "User updated");
        Ok(Response::new(UpdateResponse {
            user: Some(user_to_proto(&user)),
        }))
    }

    async fn delete(
        &self,
        request: Request<DeleteRequest>,
    ) -> Result<Response<DeleteResponse>, Status> {
        const OP: &str = "grpc.users.delete";
        let ctx = self.begin(OP, &request)?;
        let id = parse_uuid(OP, &request.get_ref().id)?;

        let user = self
            .service
            .delete_user(&ctx, id)
            .await
            .map_err(|e| fail(OP, Some(id), e))?;

        info!(op = OP, user_id = %id, "User deleted");
        Ok(Response::new(DeleteResponse {
            user: Some(user_to_proto(&user)),
        }))
    }
}

/// Log the failure and turn it into the wire status.
fn fail(op: &'static str, id: Option<Uuid>, err: DomainError) -> Status {
    match &err {
        DomainError::Internal(msg) => error!(op, user_id = ?id, error = %msg, "Request failed"),
        other => warn!(op, user_id = ?id, reason = %other, "Request rejected"),
    }
    Status::from(AppError::from(err))
}

fn missing_user(op: &'static str) -> Status {
    fail(op, None, DomainError::invalid_argument("User payload is required"))
}

/// Parse UUID from string.
fn parse_uuid(op: &'static str, s: &str) -> Result<Uuid, Status> {
    Uuid::parse_str(s).map_err(|_| fail(op, None, DomainError::invalid_argument("Invalid UUID format")))
}

fn proto_to_user(op: &'static str, user: Option<pb::User>) -> Result<User, Status> {
    let user = user.ok_or_else(|| missing_user(op))?;
    let id = parse_uuid(op, &user.id)?;
    Ok(User::new(id, user.login, user.password, user.role))
}

/// Convert domain User to its wire form.
fn user_to_proto(user: &User) -> pb::User {
    pb::User {
        id: user.id.to_string(),
        login: user.login.clone(),
        password: user.password.clone(),
        role: user.role.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::MockUserService;
    use tonic::Code;

    fn grpc(service: MockUserService) -> UserGrpcService {
        UserGrpcService::new(Arc::new(service))
    }

    fn wire_user(id: Uuid) -> pb::User {
        pb::User {
            id: id.to_string(),
            login: "alice".to_string(),
            password: "secret".to_string(),
            role: "admin".to_string(),
        }
    }

    #[tokio::test]
    async fn get_users_returns_every_user() {
        let mut service = MockUserService::new();
        service.expect_list_users().returning(|_| {
            Ok(vec![
                User::new(Uuid::new_v4(), "a", "p", "user"),
                User::new(Uuid::new_v4(), "b", "p", "admin"),
            ])
        });

        let response = grpc(service)
            .get_users(Request::new(GetUsersRequest {}))
            .await
            .unwrap();

        assert_eq!(response.into_inner().users.len(), 2);
    }

    #[tokio::test]
    async fn get_user_by_id_rejects_bad_uuid() {
        // No expectations: the service must not be reached
        let service = MockUserService::new();

        let status = grpc(service)
            .get_user_by_id(Request::new(GetUserByIdRequest {
                id: "not-a-uuid".to_string(),
            }))
            .await
            .unwrap_err();

        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn get_user_by_id_not_found() {
        let mut service = MockUserService::new();
        service
            .expect_get_user()
            .returning(|_, _| Err(DomainError::not_found("User")));

        let status = grpc(service)
            .get_user_by_id(Request::new(GetUserByIdRequest {
                id: Uuid::new_v4().to_string(),
            }))
            .await
            .unwrap_err();

        assert_eq!(status.code(), Code::NotFound);
    }

    #[tokio::test]
    async fn insert_duplicate_is_already_exists() {
        let mut service = MockUserService::new();
        service
            .expect_insert_user()
            .returning(|_, _| Err(DomainError::already_exists("User")));

        let status = grpc(service)
            .insert(Request::new(InsertRequest {
                user: Some(wire_user(Uuid::new_v4())),
            }))
            .await
            .unwrap_err();

        assert_eq!(status.code(), Code::AlreadyExists);
    }

    #[tokio::test]
    async fn insert_without_user_is_invalid_argument() {
        let service = MockUserService::new();

        let status = grpc(service)
            .insert(Request::new(InsertRequest { user: None }))
            .await
            .unwrap_err();

        assert_eq!(status.code(), Code::InvalidArgument);
    }

    #[tokio::test]
    async fn update_uses_request_id_over_payload_id() {
        let path_id = Uuid::new_v4();

        let mut service = MockUserService::new();
        service
            .expect_update_user()
            .withf(move |_, id, user| *id == path_id && user.id == path_id)
            .returning(|_, _, user| Ok(user));

        let response = grpc(service)
            .update(Request::new(UpdateRequest {
                id: path_id.to_string(),
                user: Some(wire_user(Uuid::new_v4())),
            }))
            .await
            .unwrap();

        let user = response.into_inner().user.unwrap();
        assert_eq!(user.id, path_id.to_string());
        assert_eq!(user.login, "alice");
    }

    #[tokio::test]
    async fn delete_missing_user_is_not_found() {
        let mut service = MockUserService::new();
        service
            .expect_delete_user()
            .returning(|_, _| Err(DomainError::not_found("User")));

        let status = grpc(service)
            .delete(Request::new(DeleteRequest {
                id: Uuid::new_v4().to_string(),
            }))
            .await
            .unwrap_err();

        assert_eq!(status.code(), Code::NotFound);
    }

    #[tokio::test]
    async fn internal_error_hides_details() {
        let mut service = MockUserService::new();
        service
            .expect_list_users()
            .returning(|_| Err(DomainError::internal("pool timed out")));

        let status = grpc(service)
            .get_users(Request::new(GetUsersRequest {}))
            .await
            .unwrap_err();

        assert_eq!(status.code(), Code::Internal);
        assert!(!status.message().contains("pool"));
    }

    #[tokio::test]
    async fn expired_deadline_skips_service() {
        let service = MockUserService::new();
        let mut request = Request::new(GetUsersRequest {});
        request
            .metadata_mut()
            .insert("grpc-timeout", "0n".parse().unwrap());

        let status = grpc(service).get_users(request).await.unwrap_err();

        assert_eq!(status.code(), Code::DeadlineExceeded);
    }

    #[tokio::test]
    async fn shutdown_cancels_before_service_call() {
        let service = MockUserService::new();
        let shutdown = CancellationToken::new();
        let grpc = grpc(service).with_shutdown(shutdown.clone());

        shutdown.cancel();
        let status = grpc
            .delete(Request::new(DeleteRequest {
                id: Uuid::new_v4().to_string(),
            }))
            .await
            .unwrap_err();

        assert_eq!(status.code(), Code::Cancelled);
    }
}
