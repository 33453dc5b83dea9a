use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Args;
use crate::extractor::is_html;
use crate::validator::validate;

// What the extraction handler needs from a fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub final_url: String,
    pub status_code: u16,
    pub content_type: String,
    pub body: String, // empty unless the content type is HTML
}

#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("{0}")]
    Request(String),
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Outbound GET of a validated URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError>;
}

// reqwest-backed fetcher; no cookie store, so nothing is forwarded
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    pub fn new(args: &Args) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(args.fetch_timeout())
            .redirect(redirect_policy(args.max_redirects))
            .user_agent(args.user_agent.as_str())
            .build()?;

        Ok(Self {
            client,
            timeout: args.fetch_timeout(),
        })
    }

    fn map_error(&self, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

// Every hop goes through the same validator as the requested URL, so a public
// host cannot bounce the fetch onto an internal address.
fn redirect_policy(max_redirects: usize) -> reqwest::redirect::Policy {
    reqwest::redirect::Policy::custom(move |attempt| {
        match check_redirect(attempt.url(), attempt.previous().len(), max_redirects) {
            Ok(()) => attempt.follow(),
            Err(reason) => {
                warn!(target_url = %attempt.url(), reason = %reason, "redirect refused");
                attempt.error(reason)
            }
        }
    })
}

// `hops` is the number of URLs already visited, the original request included
pub fn check_redirect(target: &reqwest::Url, hops: usize, max_redirects: usize) -> Result<(), String> {
    if hops > max_redirects {
        return Err(format!("too many redirects (max {max_redirects})"));
    }
    let verdict = validate(target.as_str());
    if !verdict.allowed {
        return Err(format!("redirect to {target} refused: {}", verdict.reason));
    }
    Ok(())
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        let final_url = response.url().to_string();
        let status_code = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        // don't download bodies we are going to reject anyway
        if !is_html(&content_type) {
            debug!(url, content_type = %content_type, "skipping non-HTML body");
            return Ok(FetchedPage {
                final_url,
                status_code,
                content_type,
                body: String::new(),
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout(self.timeout)
            } else {
                FetchError::Body(e.to_string())
            }
        })?;

        Ok(FetchedPage {
            final_url,
            status_code,
            content_type,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> reqwest::Url {
        reqwest::Url::parse(s).unwrap()
    }

    #[test]
    fn public_redirect_is_followed() {
        assert!(check_redirect(&url("https://www.example.com/next"), 1, 10).is_ok());
    }

    #[test]
    fn redirect_to_metadata_address_is_refused() {
        let err = check_redirect(&url("http://169.254.169.254/latest/meta-data/"), 1, 10).unwrap_err();
        assert!(err.contains("Private/unsafe IPs are not allowed"));
    }

    #[test]
    fn redirect_to_localhost_or_other_scheme_is_refused() {
        assert!(check_redirect(&url("http://localhost:8080/admin"), 1, 10).is_err());
        assert!(check_redirect(&url("ftp://example.com/file"), 1, 10).is_err());
        assert!(check_redirect(&url("http://[::7f00:1]/"), 1, 10).is_err());
    }

    #[test]
    fn redirect_chain_is_capped() {
        assert!(check_redirect(&url("https://example.com/"), 10, 10).is_ok());
        let err = check_redirect(&url("https://example.com/"), 11, 10).unwrap_err();
        assert!(err.contains("too many redirects"));
    }

    #[test]
    fn client_builds_with_default_args() {
        assert!(HttpFetcher::new(&Args::default()).is_ok());
    }
}
