use axum::http::HeaderMap;
use dashmap::DashMap;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

pub const UNKNOWN_CLIENT: &str = "unknown";

// Outcome of a single admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmitResult {
    pub allowed: bool,
    pub retry_after_secs: u64, // 0 when allowed
}

/// Sliding-window limiter: at most `max_requests` per `window`, per client key.
///
/// Each key owns a queue of request timestamps. Stale timestamps are dropped
/// from the front lazily when the key is checked again; keys themselves are
/// never removed.
pub struct RateLimiter {
    windows: DashMap<String, VecDeque<Instant>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            windows: DashMap::new(),
            max_requests,
            window,
        }
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn check(&self, key: &str) -> AdmitResult {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> AdmitResult {
        // the entry guard holds the shard lock for the whole evict/check/append
        let mut timestamps = self.windows.entry(key.to_string()).or_default();

        while let Some(&oldest) = timestamps.front() {
            if now.saturating_duration_since(oldest) > self.window {
                timestamps.pop_front();
            } else {
                break;
            }
        }

        if timestamps.len() >= self.max_requests {
            let retry_after_secs = match timestamps.front() {
                Some(&oldest) => self
                    .window
                    .saturating_sub(now.saturating_duration_since(oldest))
                    .as_secs(),
                None => self.window.as_secs(),
            };
            return AdmitResult {
                allowed: false,
                retry_after_secs: retry_after_secs.max(1),
            };
        }

        timestamps.push_back(now);
        AdmitResult {
            allowed: true,
            retry_after_secs: 0,
        }
    }

    // Number of client keys ever seen
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

// First X-Forwarded-For entry, else the peer IP, else "unknown".
// The header is taken at face value; it only buckets clients for fairness.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|s| !s.is_empty());

    if let Some(first) = forwarded {
        return first.to_string();
    }

    match peer {
        Some(addr) => addr.ip().to_string(),
        None => UNKNOWN_CLIENT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn limiter() -> RateLimiter {
        RateLimiter::new(5, Duration::from_secs(60))
    }

    #[test]
    fn sixth_request_in_window_is_rejected() {
        let rl = limiter();
        let t0 = Instant::now();

        for i in 0..5 {
            let res = rl.check_at("1.2.3.4", t0 + Duration::from_secs(i));
            assert!(res.allowed, "request {i} should be admitted");
        }

        let sixth = rl.check_at("1.2.3.4", t0 + Duration::from_secs(10));
        assert!(!sixth.allowed);
        // oldest is t0, so 60 - 10 = 50
        assert_eq!(sixth.retry_after_secs, 50);

        let seventh = rl.check_at("1.2.3.4", t0 + Duration::from_secs(71));
        assert!(seventh.allowed);
    }

    #[test]
    fn admitted_again_after_window_elapses() {
        let rl = limiter();
        let t0 = Instant::now();
        for _ in 0..5 {
            assert!(rl.check_at("k", t0).allowed);
        }
        assert!(!rl.check_at("k", t0).allowed);
        assert!(rl.check_at("k", t0 + Duration::from_secs(61)).allowed);
    }

    #[test]
    fn rejected_requests_do_not_extend_the_window() {
        let rl = limiter();
        let t0 = Instant::now();
        for _ in 0..5 {
            rl.check_at("k", t0);
        }
        for s in 1..30 {
            assert!(!rl.check_at("k", t0 + Duration::from_secs(s)).allowed);
        }
        assert!(rl.check_at("k", t0 + Duration::from_secs(61)).allowed);
    }

    #[test]
    fn retry_after_is_at_least_one_second() {
        let rl = limiter();
        let t0 = Instant::now();
        for _ in 0..5 {
            rl.check_at("k", t0);
        }
        let res = rl.check_at("k", t0 + Duration::from_millis(59_900));
        assert!(!res.allowed);
        assert_eq!(res.retry_after_secs, 1);

        // exactly at the window edge the entry is still counted
        let edge = rl.check_at("k", t0 + Duration::from_secs(60));
        assert!(!edge.allowed);
        assert_eq!(edge.retry_after_secs, 1);
    }

    #[test]
    fn keys_are_independent() {
        let rl = limiter();
        let t0 = Instant::now();
        for _ in 0..5 {
            rl.check_at("a", t0);
        }
        assert!(!rl.check_at("a", t0).allowed);
        assert!(rl.check_at("b", t0).allowed);
        assert_eq!(rl.tracked_clients(), 2);
    }

    #[test]
    fn concurrent_checks_on_one_key_admit_exactly_the_limit() {
        let rl = std::sync::Arc::new(limiter());
        let t0 = Instant::now();

        let handles: Vec<_> = (0..64)
            .map(|_| {
                let rl = std::sync::Arc::clone(&rl);
                std::thread::spawn(move || rl.check_at("shared", t0).allowed)
            })
            .collect();
        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|allowed| *allowed)
            .count();

        assert_eq!(admitted, 5);
        assert!(!rl.check_at("shared", t0).allowed);
    }

    #[test]
    fn client_key_prefers_first_forwarded_entry() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static(" 203.0.113.7 , 10.0.0.1"),
        );
        let peer: SocketAddr = "192.0.2.1:4000".parse().unwrap();
        assert_eq!(client_key(&headers, Some(peer)), "203.0.113.7");
    }

    #[test]
    fn client_key_falls_back_to_peer_then_unknown() {
        let peer: SocketAddr = "192.0.2.1:4000".parse().unwrap();
        assert_eq!(client_key(&HeaderMap::new(), Some(peer)), "192.0.2.1");
        assert_eq!(client_key(&HeaderMap::new(), None), "unknown");

        let mut blank = HeaderMap::new();
        blank.insert("x-forwarded-for", HeaderValue::from_static(""));
        assert_eq!(client_key(&blank, Some(peer)), "192.0.2.1");
    }
}
