use axum::{Json, response::IntoResponse};

// liveness probe; never rate limited
pub async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
