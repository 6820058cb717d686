//! Meme Digest API Server
//!
//! HTTP API that turns trending news into meme image prompts.

mod config;
mod routes;

use axum::{
    http::{header, Method},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use digest_services::MemePipeline;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::{build_pipeline, ApiConfig};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Digest pipeline (optional - requires NEWS_API_KEY and a generator key)
    pub pipeline: Option<Arc<MemePipeline>>,
}

/// Router with every API route and CORS for the frontend
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .nest("/api", routes::api_routes())
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,digest_api=debug")),
        )
        .init();

    info!("Starting Meme Digest API");

    let config = ApiConfig::from_env();
    info!("Meme templates at: {}", config.templates_path.display());

    let pipeline = match build_pipeline(&config) {
        Ok(pipeline) => {
            info!("Digest pipeline initialized successfully");
            Some(Arc::new(pipeline))
        }
        Err(e) => {
            info!(
                "Digest pipeline not available: {}. Set NEWS_API_KEY and GENERATOR_API_KEY to enable.",
                e
            );
            None
        }
    };

    let app = app(AppState { pipeline });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
