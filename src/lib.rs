pub mod cache;
pub mod config;
pub mod error;
pub mod extractor;
pub mod fetcher;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod rate_limit;
pub mod state;
pub mod validator;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use crate::handlers::{extract_handler, health_handler, metrics_handler, rate_limit_middleware};
use crate::state::AppState;

// Router with every route behind the rate limiter (which skips /health and /metrics)
pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/extract", post(extract_handler))
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            rate_limit_middleware,
        ))
        .with_state(state)
}
