use std::sync::Arc;
use crate::cache::ResponseCache;
use crate::config::Args;
use crate::fetcher::PageFetcher;
use crate::rate_limit::RateLimiter;
// app's shared state, built once in main and handed to the router

pub struct AppState {
    pub fetcher: Arc<dyn PageFetcher>,
    pub cache: ResponseCache,      // requested URL -> extraction result
    pub rate_limiter: RateLimiter, // client key -> recent request timestamps
}

impl AppState {
    pub fn new(args: &Args, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            cache: ResponseCache::new(args.cache_ttl()),
            rate_limiter: RateLimiter::new(args.rate_limit, args.rate_window()),
        }
    }
}
