//! Web server for the storefront admin
#![forbid(unsafe_code)]

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use storefront_core::Config;
use storefront_web::{AppState, build_app};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if it exists (for development convenience)
    let _ = dotenvy::dotenv();

    let config = Config::load(None).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    storefront_core::init_logging(&config.logging)?;

    let state = AppState::new(config.clone())?;
    if config.webserver.refresh_on_start {
        spawn_initial_refresh(&state);
    }

    let app = build_app(state);

    let host: IpAddr = config.webserver.host.parse().map_err(|e| {
        format!("Invalid web server host '{}': {}", config.webserver.host, e)
    })?;
    let addr = SocketAddr::new(host, config.webserver.port);

    info!(%addr, catalog = %config.catalog.base_url, "Starting storefront web server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Load the catalog and balances in the background
fn spawn_initial_refresh(state: &AppState) {
    let catalog = Arc::clone(&state.catalog);
    tokio::spawn(async move {
        if let Err(e) = catalog.refresh().await {
            warn!(error = %e, "Initial catalog refresh failed");
        }
    });

    let balance = Arc::clone(&state.balance);
    tokio::spawn(async move {
        if let Err(e) = balance.refresh().await {
            warn!(error = %e, "Initial balance inquiry failed");
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down gracefully");
}
