use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::warn;
use crate::error::ApiError;
use crate::metrics::RATE_LIMITED;
use crate::rate_limit::client_key;
use crate::state::AppState;

// Ops endpoints skip the limiter
const BYPASS_PATHS: &[&str] = &["/health", "/metrics"];

pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if BYPASS_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    // ConnectInfo is absent when the router is driven without a listener
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let key = client_key(request.headers(), peer);

    let admit = state.rate_limiter.check(&key);
    if !admit.allowed {
        RATE_LIMITED.inc();
        warn!(client = %key, retry_after = admit.retry_after_secs, "rate limit exceeded");
        return ApiError::RateLimited {
            limit: state.rate_limiter.max_requests(),
            delay: state.rate_limiter.window().as_secs(),
            retry_after: admit.retry_after_secs,
        }
        .into_response();
    }

    next.run(request).await
}
