//! News preview endpoint

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use digest_core::Article;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::AppState;

/// Trends used when previewing news without user input
const DEFAULT_TRENDS: [&str; 3] = ["AI", "artificial intelligence", "machine learning"];
const PREVIEW_LIMIT: usize = 10;
const PREVIEW_DESCRIPTION_CHARS: usize = 500;

/// Query parameters for the news preview
#[derive(Debug, Deserialize)]
pub struct NewsPreviewQuery {
    /// Days to look back
    pub duration: Option<u32>,
}

/// One article as shown in the preview
#[derive(Debug, Serialize, PartialEq)]
pub struct PreviewArticle {
    pub title: String,
    pub source: String,
    pub published: String,
    pub url: String,
    pub description: String,
}

impl From<&Article> for PreviewArticle {
    fn from(article: &Article) -> Self {
        let description = if article.description.is_empty() {
            String::new()
        } else {
            let head: String = article
                .description
                .chars()
                .take(PREVIEW_DESCRIPTION_CHARS)
                .collect();
            format!("{}...", head)
        };

        Self {
            title: article.title.clone(),
            source: article.source_name.clone(),
            published: article.published_at.clone(),
            url: article.url.clone(),
            description,
        }
    }
}

/// Create news routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/news", get(preview_news))
}

/// GET /api/news - Preview recent articles for the default trends
async fn preview_news(
    State(state): State<AppState>,
    params: Result<Query<NewsPreviewQuery>, QueryRejection>,
) -> impl IntoResponse {
    let Query(params) = match params {
        Ok(query) => query,
        Err(rejection) => {
            return (
                rejection.status(),
                Json(serde_json::json!({
                    "success": false,
                    "error": rejection.body_text()
                })),
            )
                .into_response();
        }
    };

    let Some(pipeline) = &state.pipeline else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({
                "success": false,
                "error": "Digest pipeline not configured"
            })),
        )
            .into_response();
    };

    let trends: Vec<String> = DEFAULT_TRENDS.iter().map(|t| t.to_string()).collect();
    let duration = params.duration.unwrap_or(1);

    match pipeline.fetch_articles(&trends, duration).await {
        Ok(articles) => {
            let news: Vec<PreviewArticle> = articles
                .iter()
                .take(PREVIEW_LIMIT)
                .map(PreviewArticle::from)
                .collect();
            info!("Serving {} preview articles", news.len());
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "success": true,
                    "news": news
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to fetch preview news: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "success": false,
                    "error": e.to_string()
                })),
            )
                .into_response()
        }
    }
}
