mod health;
mod metrics;
mod extract;
mod rate_limit;

pub use health::health_handler;
pub use metrics::metrics_handler;
pub use extract::extract_handler;
pub use rate_limit::rate_limit_middleware;
