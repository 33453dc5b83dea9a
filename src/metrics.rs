use lazy_static::lazy_static;
use prometheus::{Counter, Encoder, Gauge, Histogram, TextEncoder, register_counter, register_gauge, register_histogram};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("metagw_extract_requests_total", "Total number of extract requests").unwrap();
    pub static ref CACHE_HITS: Counter =
        register_counter!("metagw_cache_hits_total", "Total cache hits").unwrap();
    pub static ref CACHE_MISSES: Counter =
        register_counter!("metagw_cache_misses_total", "Total cache misses").unwrap();
    pub static ref RATE_LIMITED: Counter =
        register_counter!("metagw_rate_limited_total", "Requests rejected by the rate limiter").unwrap();
    pub static ref FETCH_FAILURES: Counter =
        register_counter!("metagw_fetch_failures_total", "Outbound fetches that failed or timed out").unwrap();
    pub static ref FETCH_LATENCY: Histogram = register_histogram!(
        "metagw_fetch_latency_seconds",
        "Outbound fetch latency in seconds"
    )
    .unwrap();
    pub static ref CACHE_SIZE: Gauge =
        register_gauge!("metagw_cache_size", "Current number of items in cache").unwrap();
}

// Prometheus text exposition of the default registry
pub fn render() -> Result<String, String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| e.to_string())?;
    String::from_utf8(buffer).map_err(|e| e.to_string())
}
