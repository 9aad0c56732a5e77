//! gRPC clients for calling microservices.

mod user_client;

pub use user_client::{ClientError, ClientResult, UserClient};
