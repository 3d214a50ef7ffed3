// ABOUTME: HTTP server bootstrap for the DocuApp API
// ABOUTME: Opens the database, applies CORS, and serves until Ctrl-C

use axum::http::{HeaderValue, Method};
use axum::Router;
use docuapp_api::{create_router, DbState};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::Config;

pub fn cors_layer(origin: &str) -> Result<CorsLayer, Box<dyn std::error::Error>> {
    Ok(CorsLayer::new()
        .allow_origin(origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any))
}

/// The API router with CORS for `config.cors_origin`
pub fn build_app(state: DbState, config: &Config) -> Result<Router, Box<dyn std::error::Error>> {
    let cors = cors_layer(&config.cors_origin)?;
    Ok(create_router(state).layer(cors))
}

pub async fn run_server(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let state = DbState::init_with_path(config.database_path.clone()).await?;
    let app = build_app(state, &config)?;

    let addr = config.socket_addr();
    info!("CORS origin: {}", config.cors_origin);
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
