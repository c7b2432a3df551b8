use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::AppState;

#[axum::debug_handler]
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let database = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => "ok",
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not reach the database");
            "unavailable"
        }
    };
    let cache = if state.cache.is_enabled() {
        "enabled"
    } else {
        "disabled"
    };

    let body = json!({
        "status": "ok",
        "database": database,
        "cache": cache,
    });
    (StatusCode::OK, Json(body))
}
