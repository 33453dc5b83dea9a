use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::fetcher::FetchError;

// Every failure is scoped to one request and rendered as JSON
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing 'url' in JSON body")]
    MissingUrl,

    #[error("{0}")]
    InvalidUrl(&'static str),

    #[error("Too Many Requests")]
    RateLimited {
        limit: usize,
        delay: u64,
        retry_after: u64,
    },

    #[error("Failed to fetch URL")]
    UpstreamFetch(#[from] FetchError),

    #[error("URL did not return HTML")]
    UnsupportedContent { content_type: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingUrl | ApiError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::UpstreamFetch(_) => StatusCode::BAD_GATEWAY,
            ApiError::UnsupportedContent { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.to_string();

        match self {
            ApiError::RateLimited {
                limit,
                delay,
                retry_after,
            } => {
                let retry_after = retry_after.max(1);
                let body = json!({
                    "error": error,
                    "limit": limit,
                    "delay": delay,
                    "retry_after_seconds": retry_after,
                });
                let mut response = (status, Json(body)).into_response();
                response
                    .headers_mut()
                    .insert(RETRY_AFTER, HeaderValue::from(retry_after));
                response
            }
            ApiError::UpstreamFetch(source) => (
                status,
                Json(json!({ "error": error, "details": source.to_string() })),
            )
                .into_response(),
            ApiError::UnsupportedContent { content_type } => (
                status,
                Json(json!({ "error": error, "content_type": content_type })),
            )
                .into_response(),
            ApiError::MissingUrl | ApiError::InvalidUrl(_) | ApiError::Internal(_) => {
                (status, Json(json!({ "error": error }))).into_response()
            }
        }
    }
}
