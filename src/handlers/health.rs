use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::app::AppState;

/// GET /health - Liveness plus a decision store round trip
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    match state.moderation.store().ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "ok": true }))),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "ok": false, "error": e.to_string() })),
            )
        }
    }
}

/// GET /ping - Process is up; touches nothing else
pub async fn ping() -> Json<Value> {
    Json(json!({ "ok": true }))
}
