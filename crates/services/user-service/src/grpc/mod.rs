//! gRPC transport layer.

mod context;
mod user_grpc;

pub use context::{parse_grpc_timeout, request_context};
pub use user_grpc::UserGrpcService;
