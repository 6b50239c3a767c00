use std::net::SocketAddr;

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tracing::{info, warn, Level};

mod auth;
mod config;
mod guard;
mod routes;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    let config = config::GatewayConfig::from_env();
    if config.using_fallback_secret() {
        warn!("JWT_SECRET is not set; using the development fallback secret");
    }

    // CORS setup so the dev frontend server can talk to the gateway.
    let cors = CorsLayer::new()
        .allow_origin(config.frontend_dev_origin.parse::<HeaderValue>()?)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    let app = routes::build_router(config.clone()).layer(cors);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    info!("Starting gateway on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
