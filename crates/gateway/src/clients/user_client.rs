//! gRPC client for user-service.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tonic::transport::{Channel, Endpoint};
use tonic::{Code, Status};
use tracing::{debug, warn};
use uuid::Uuid;

use common::GrpcClientConfig;
use domain::{DomainError, RequestContext, User};
use proto::users_manager::{
    self as pb, DeleteRequest, GetUserByIdRequest, GetUsersRequest, InsertRequest, UpdateRequest,
};
use proto::UsersManagerClient;

use crate::service::UserStorage;

/// Errors surfaced by the user-service client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("User not found")]
    NotFound,

    #[error("User already exists")]
    AlreadyExists,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Request cancelled")]
    Canceled,

    #[error("Deadline exceeded")]
    DeadlineExceeded,

    #[error("User service error: {0}")]
    Internal(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl From<Status> for ClientError {
    fn from(status: Status) -> Self {
        match status.code() {
            Code::NotFound => ClientError::NotFound,
            Code::AlreadyExists => ClientError::AlreadyExists,
            Code::InvalidArgument => ClientError::InvalidArgument(status.message().to_string()),
            Code::Cancelled => ClientError::Canceled,
            Code::DeadlineExceeded => ClientError::DeadlineExceeded,
            _ => ClientError::Internal(status.message().to_string()),
        }
    }
}

impl From<DomainError> for ClientError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Canceled => ClientError::Canceled,
            DomainError::DeadlineExceeded => ClientError::DeadlineExceeded,
            other => ClientError::Internal(other.to_string()),
        }
    }
}

/// gRPC client wrapper for user-service.
#[derive(Clone)]
pub struct UserClient {
    client: UsersManagerClient<Channel>,
}

impl UserClient {
    /// Connect to user-service.
    pub async fn connect(config: &GrpcClientConfig) -> Result<Self, tonic::transport::Error> {
        debug!(endpoint = %config.endpoint, "Connecting to user-service");
        let channel = Endpoint::from_shared(config.endpoint.clone())?
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .connect()
            .await?;
        Ok(Self::new(channel))
    }

    /// Wrap an already established channel.
    pub fn new(channel: Channel) -> Self {
        Self {
            client: UsersManagerClient::new(channel),
        }
    }
}

/// Build an outgoing request carrying whatever is left of the deadline.
fn request<T>(ctx: &RequestContext, message: T) -> ClientResult<tonic::Request<T>> {
    ctx.check()?;

    let mut request = tonic::Request::new(message);
    if let Some(remaining) = ctx.remaining() {
        request.set_timeout(remaining);
    }
    Ok(request)
}

/// Map a failed call, reading the server's timeout cancellation as a deadline
/// miss when our own deadline has passed too.
fn call_error(ctx: &RequestContext, status: Status) -> ClientError {
    match ClientError::from(status) {
        ClientError::Canceled if ctx.check() == Err(DomainError::DeadlineExceeded) => {
            ClientError::DeadlineExceeded
        }
        other => other,
    }
}

fn required(user: Option<pb::User>) -> ClientResult<User> {
    user.ok_or_else(|| ClientError::Internal("Empty response from user-service".to_string()))
        .and_then(proto_to_user)
}

/// Convert the wire user to a domain User.
fn proto_to_user(user: pb::User) -> ClientResult<User> {
    let id = Uuid::parse_str(&user.id)
        .map_err(|_| ClientError::Internal("Invalid UUID from user-service".to_string()))?;
    Ok(User::new(id, user.login, user.password, user.role))
}

/// Rows the gateway cannot read are logged and left out of the listing.
fn collect_users(users: Vec<pb::User>) -> Vec<User> {
    users
        .into_iter()
        .filter_map(|wire| {
            let raw_id = wire.id.clone();
            proto_to_user(wire)
                .map_err(|err| warn!(user_id = %raw_id, error = %err, "Wrong user format"))
                .ok()
        })
        .collect()
}

fn user_to_proto(user: User) -> pb::User {
    pb::User {
        id: user.id.to_string(),
        login: user.login,
        password: user.password,
        role: user.role,
    }
}

#[async_trait]
impl UserStorage for UserClient {
    async fn list(&self, ctx: &RequestContext) -> ClientResult<Vec<User>> {
        let request = request(ctx, GetUsersRequest {})?;

        let mut client = self.client.clone();
        let response = client
            .get_users(request)
            .await
            .map_err(|status| call_error(ctx, status))?;

        Ok(collect_users(response.into_inner().users))
    }

    async fn find_by_id(&self, ctx: &RequestContext, id: Uuid) -> ClientResult<User> {
        let request = request(ctx, GetUserByIdRequest { id: id.to_string() })?;

        let mut client = self.client.clone();
        let response = client
            .get_user_by_id(request)
            .await
            .map_err(|status| call_error(ctx, status))?;
        required(response.into_inner().user)
    }

    async fn insert(&self, ctx: &RequestContext, user: User) -> ClientResult<User> {
        let request = request(
            ctx,
            InsertRequest {
                user: Some(user_to_proto(user)),
            },
        )?;

        let mut client = self.client.clone();
        let response = client
            .insert(request)
            .await
            .map_err(|status| call_error(ctx, status))?;
        required(response.into_inner().user)
    }

    async fn update(&self, ctx: &RequestContext, id: Uuid, user: User) -> ClientResult<User> {
        let request = request(
            ctx,
            UpdateRequest {
                id: id.to_string(),
                user: Some(user_to_proto(user)),
            },
        )?;

        let mut client = self.client.clone();
        let response = client
            .update(request)
            .await
            .map_err(|status| call_error(ctx, status))?;
        required(response.into_inner().user)
    }

    async fn delete(&self, ctx: &RequestContext, id: Uuid) -> ClientResult<User> {
        let request = request(ctx, DeleteRequest { id: id.to_string() })?;

        let mut client = self.client.clone();
        let response = client
            .delete(request)
            .await
            .map_err(|status| call_error(ctx, status))?;
        required(response.into_inner().user)
    }
}
