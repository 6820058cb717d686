//! Meme prompt generation endpoint

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use digest_core::DigestError;
use digest_services::DigestRequest;
use tracing::{error, info, warn};

use crate::AppState;

/// Create prompt routes
pub fn routes() -> Router<AppState> {
    Router::new().route("/prompts", post(generate_prompts))
}

fn failure(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (
        status,
        Json(serde_json::json!({
            "success": false,
            "error": message.into()
        })),
    )
        .into_response()
}

/// HTTP status for a failed digest run
///
/// A run that finds no articles is reported as a normal response.
fn error_status(err: &DigestError) -> StatusCode {
    match err {
        DigestError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        DigestError::NotFound(_) => StatusCode::OK,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// POST /api/prompts - Generate meme prompts for the given trends
async fn generate_prompts(
    State(state): State<AppState>,
    payload: Result<Json<DigestRequest>, JsonRejection>,
) -> impl IntoResponse {
    let Json(request) = match payload {
        Ok(body) => body,
        Err(rejection) => {
            warn!("Rejected prompt request body: {}", rejection.body_text());
            return failure(rejection.status(), rejection.body_text());
        }
    };

    info!(
        "Prompt request: trends={:?}, duration={} days, memes={}",
        request.trends, request.duration, request.memes
    );

    if request.trends.iter().all(|t| t.trim().is_empty()) {
        return failure(StatusCode::BAD_REQUEST, "Please select at least one trend");
    }
    if request.memes < 0 {
        return failure(StatusCode::BAD_REQUEST, "memes must not be negative");
    }

    let Some(pipeline) = &state.pipeline else {
        return failure(
            StatusCode::SERVICE_UNAVAILABLE,
            "Digest pipeline not configured",
        );
    };

    match pipeline.run(&request).await {
        Ok(prompts) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "success": true,
                "count": prompts.len(),
                "prompts": prompts
            })),
        )
            .into_response(),
        Err(e) => {
            let err = DigestError::from(e);
            let status = error_status(&err);
            if status.is_server_error() {
                error!("Prompt generation failed: {}", err);
            } else {
                warn!("Prompt request not fulfilled: {}", err);
            }
            failure(status, err.to_string())
        }
    }
}
