//! API Gateway Library
//!
//! This crate provides the HTTP REST API that translates requests to gRPC calls.

pub mod clients;
pub mod config;
pub mod extractors;
pub mod handlers;
pub mod openapi;
pub mod routes;
pub mod service;
pub mod state;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use domain::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::clients::UserClient;
use crate::config::GatewayConfig;
use crate::routes::create_router;
use crate::service::UsersService;
use crate::state::AppState;

/// Run the gateway as an embedded component (for combined binary).
pub async fn run_embedded(
    host: &str,
    port: u16,
    user_port: u16,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = GatewayConfig::from_env();
    config.user_service.endpoint = format!("http://127.0.0.1:{}", user_port);

    run_server_with_config(host, port, config, common::shutdown_signal()).await
}

/// Run the gateway standalone; CLI overrides win over the environment.
pub async fn run(host: Option<String>, port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let config = GatewayConfig::from_env();
    let host = host.unwrap_or_else(|| config.host.clone());
    let port = port.unwrap_or(config.port);

    run_server_with_config(&host, port, config, common::shutdown_signal()).await
}

/// Run the HTTP server until `shutdown` resolves.
pub async fn run_server_with_config<F>(
    host: &str,
    port: u16,
    config: GatewayConfig,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let user_client = Arc::new(UserClient::connect(&config.user_service).await?);
    let user_service = Arc::new(UsersService::new(user_client));

    let env = config.env;
    // Cancelled on shutdown so in-flight request contexts stop early
    let root = CancellationToken::new();
    let state = AppState::new(user_service, config).with_shutdown(root.clone());

    let app = create_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!(%env, %addr, "Gateway listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            root.cancel();
        })
        .await?;

    info!("Gateway stopped");
    Ok(())
}
