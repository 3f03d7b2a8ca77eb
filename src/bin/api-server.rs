//! Levelscan API Server
//!
//! HTTP API that fetches historical bars and returns ranked support and
//! resistance levels. Stateless; every request fetches its own bars.

use dotenvy::dotenv;
use levelscan::config::Config;
use levelscan::core::http::start_server;
use levelscan::logging;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let config = Config::from_env();
    let port = config.port;
    info!("Starting Levelscan API Server");
    info!(environment = %config.environment, "Environment");
    info!(port = port, "HTTP Server: http://0.0.0.0:{}", port);
    info!(top_k = config.top_k, base_url = %config.yahoo_base_url, "Level detection defaults");

    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(config).await {
            error!(error = %e, "HTTP server error");
        }
    });

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down API server...");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    Ok(())
}
