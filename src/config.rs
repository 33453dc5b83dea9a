use clap::Parser;
use std::time::Duration;

// Defaults, also usable directly by tests
pub const CACHE_TTL_SECONDS: u64 = 600;
pub const RATE_LIMIT_MAX: usize = 5;
pub const RATE_LIMIT_DELAY: u64 = 60;
pub const FETCH_TIMEOUT_SECONDS: u64 = 5;
pub const MAX_REDIRECTS: usize = 10;
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "metadata-gateway")]
#[command(about = "Fetches a page and returns its title, description and image")]
pub struct Args {
    // Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    // Port to run the server on
    #[arg(short, long, default_value_t = 8080)]
    pub port: u16,

    // Cache TTL in seconds
    #[arg(short, long, default_value_t = CACHE_TTL_SECONDS)]
    pub cache_ttl: u64,

    // Rate limit max requests per window, per client
    #[arg(long, default_value_t = RATE_LIMIT_MAX)]
    pub rate_limit: usize,

    // Rate limit window in seconds
    #[arg(long, default_value_t = RATE_LIMIT_DELAY)]
    pub rate_window: u64,

    // Outbound fetch timeout in seconds
    #[arg(long, default_value_t = FETCH_TIMEOUT_SECONDS)]
    pub fetch_timeout: u64,

    // Redirect hops followed before giving up
    #[arg(long, default_value_t = MAX_REDIRECTS)]
    pub max_redirects: usize,

    // User-Agent sent to target sites
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,
}

impl Args {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout)
    }
}

impl Default for Args {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cache_ttl: CACHE_TTL_SECONDS,
            rate_limit: RATE_LIMIT_MAX,
            rate_window: RATE_LIMIT_DELAY,
            fetch_timeout: FETCH_TIMEOUT_SECONDS,
            max_redirects: MAX_REDIRECTS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_parsed_empty_command_line() {
        let parsed = Args::parse_from(["metadata-gateway"]);
        let defaults = Args::default();
        assert_eq!(parsed.port, defaults.port);
        assert_eq!(parsed.cache_ttl, 600);
        assert_eq!(parsed.rate_limit, 5);
        assert_eq!(parsed.rate_window, 60);
        assert_eq!(parsed.fetch_timeout, 5);
        assert_eq!(parsed.user_agent, "Mozilla/5.0");
    }

    #[test]
    fn overrides_from_flags() {
        let parsed = Args::parse_from([
            "metadata-gateway",
            "--rate-limit",
            "20",
            "--cache-ttl",
            "30",
        ]);
        assert_eq!(parsed.rate_limit, 20);
        assert_eq!(parsed.cache_ttl(), Duration::from_secs(30));
    }
}
