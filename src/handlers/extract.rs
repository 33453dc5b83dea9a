use axum::{
    Json,
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};
use crate::error::ApiError;
use crate::extractor::{extract_metadata, is_html};
use crate::metrics::{CACHE_HITS, CACHE_MISSES, CACHE_SIZE, FETCH_FAILURES, FETCH_LATENCY, REQUEST_TOTAL};
use crate::models::{ExtractRequest, ExtractResponse, ExtractionResult};
use crate::state::AppState;
use crate::validator::validate;

// POST /extract {"url": "..."}
//
// validate -> cache -> fetch -> extract -> cache store. The fetch runs with no
// map guard held, so slow upstreams never block other clients.
pub async fn extract_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    REQUEST_TOTAL.inc();

    // bad JSON is reported the same way as a missing url
    let url = serde_json::from_slice::<ExtractRequest>(&body)
        .ok()
        .and_then(|req| req.url)
        .map(|url| url.trim().to_string())
        .unwrap_or_default();
    if url.is_empty() {
        return Err(ApiError::MissingUrl);
    }

    let verdict = validate(&url);
    if !verdict.allowed {
        warn!(url = %url, reason = verdict.reason, "rejected target url");
        return Err(ApiError::InvalidUrl(verdict.reason));
    }

    if let Some(hit) = state.cache.get(&url) {
        CACHE_HITS.inc();
        debug!(url = %url, "cache hit");
        return Ok(respond(&hit, true));
    }
    CACHE_MISSES.inc();
    debug!(url = %url, "cache miss, fetching");

    let start_time = Instant::now();
    let page = state.fetcher.fetch(&url).await.map_err(|e| {
        FETCH_FAILURES.inc();
        warn!(url = %url, error = %e, "upstream fetch failed");
        ApiError::from(e)
    })?;
    FETCH_LATENCY.observe(start_time.elapsed().as_secs_f64());

    if !is_html(&page.content_type) {
        info!(url = %url, content_type = %page.content_type, "non-HTML response, not cached");
        return Err(ApiError::UnsupportedContent {
            content_type: page.content_type,
        });
    }

    let metadata = extract_metadata(&page.body);
    let result = Arc::new(ExtractionResult {
        url: url.clone(),
        final_url: page.final_url,
        status_code: page.status_code,
        content_type: page.content_type,
        html_length: page.body.chars().count(),
        title: metadata.title,
        description: metadata.description,
        image: metadata.image,
    });

    // keyed by what the client asked for, not where redirects ended up
    state.cache.set(&url, Arc::clone(&result));
    CACHE_SIZE.set(state.cache.len() as f64);

    info!(
        url = %url,
        final_url = %result.final_url,
        status = result.status_code,
        "extracted metadata"
    );

    Ok(respond(&result, false))
}

fn respond(result: &ExtractionResult, cached: bool) -> Response {
    Json(ExtractResponse { result, cached }).into_response()
}
