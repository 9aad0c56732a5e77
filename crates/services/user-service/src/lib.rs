//! User Service Library
//!
//! This crate provides user management functionality via gRPC.
//! It can be run as a standalone service or embedded in the combined binary.

pub mod config;
pub mod grpc;
pub mod infra;
pub mod repository;
pub mod service;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use domain::CancellationToken;
use tonic::transport::Server;
use tracing::info;

use crate::config::UserServiceConfig;
use crate::grpc::UserGrpcService;
use crate::infra::Database;
use crate::repository::UserStore;
use crate::service::UserManager;

/// Run the user service as an embedded component (for combined binary).
pub async fn run_embedded(host: &str, port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let config = UserServiceConfig::from_env();
    run_server_with_config(host, port, config, common::shutdown_signal()).await
}

/// Run the user service standalone; CLI overrides win over the environment.
pub async fn run(host: Option<String>, port: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let config = UserServiceConfig::from_env();
    let host = host.unwrap_or_else(|| config.host.clone());
    let port = port.unwrap_or(config.port);

    run_server_with_config(&host, port, config, common::shutdown_signal()).await
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = UserServiceConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Run the gRPC server until `shutdown` resolves.
pub async fn run_server_with_config<F>(
    host: &str,
    port: u16,
    config: UserServiceConfig,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: Future<Output = ()>,
{
    // Initialize database
    let db = Database::connect(&config.database).await?;
    db.ping().await?;

    // Create repository and service
    let user_repo = Arc::new(UserStore::new(db.get_connection()));
    let user_service = Arc::new(UserManager::new(user_repo));

    // Cancelled on shutdown so in-flight request contexts stop early
    let root = CancellationToken::new();
    let grpc_service = UserGrpcService::new(user_service).with_shutdown(root.clone());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!(env = %config.env, %addr, "User service listening");

    Server::builder()
        .add_service(proto::UsersManagerServer::new(grpc_service))
        .serve_with_shutdown(addr, async move {
            shutdown.await;
            root.cancel();
        })
        .await?;

    info!("User service stopped");
    Ok(())
}
