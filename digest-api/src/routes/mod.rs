//! API route definitions

mod health;
mod news;
mod prompts;

use axum::Router;
use crate::AppState;

/// Create all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(news::routes())
        .merge(prompts::routes())
        .merge(health::routes())
}
