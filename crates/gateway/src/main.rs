//! API Gateway - HTTP REST API in front of the user service.

use clap::{Parser, Subcommand};

use common::Environment;

#[derive(Parser)]
#[command(name = "gateway")]
#[command(about = "HTTP gateway for the user service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Overrides GATEWAY_HOST
        #[arg(long)]
        host: Option<String>,
        /// Overrides GATEWAY_PORT
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    common::logging::init(Environment::from_env());

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            gateway_lib::run(host, port).await?;
        }
    }

    Ok(())
}
