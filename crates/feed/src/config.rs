use std::time::Duration;

use url::Url;

use crate::error::{FeedError, Result};
use crate::retry::RetryPolicy;

/// Default pause between the end of one cycle and the start of the next.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Default overall timeout for a single HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Default capacity of the event broadcast channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Credentials presented to the login endpoint.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Configurable options for a polling feed.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Base URL of the inference API; endpoint paths are joined onto it.
    pub base_url: Url,

    /// Pause between cycles. The timer only runs while no cycle is in
    /// flight, so the effective period is `poll_interval` plus cycle time.
    pub poll_interval: Duration,

    /// Overall timeout applied to every HTTP request by the shared client.
    pub request_timeout: Duration,

    /// Retry behavior for transient failures within one cycle.
    pub retry: RetryPolicy,

    /// Capacity of the broadcast channel feed events are published on.
    pub event_capacity: usize,
}

impl FeedConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            poll_interval: DEFAULT_POLL_INTERVAL,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            retry: RetryPolicy::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Build a config from a textual base URL.
    pub fn parse(base_url: &str) -> Result<Self> {
        let url = Url::parse(base_url)
            .map_err(|e| FeedError::invalid_base_url(base_url, e.to_string()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FeedError::invalid_base_url(
                base_url,
                format!("unsupported scheme `{}`", url.scheme()),
            ));
        }
        Ok(Self::new(url))
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_http_base() {
        let config = FeedConfig::parse("http://127.0.0.1:8080").unwrap();
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:8080/");
        assert_eq!(config.poll_interval, DEFAULT_POLL_INTERVAL);
        assert_eq!(config.request_timeout, DEFAULT_REQUEST_TIMEOUT);
    }

    #[test]
    fn parse_rejects_garbage() {
        let err = FeedConfig::parse("not a url").unwrap_err();
        assert!(matches!(err, FeedError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn parse_rejects_non_http_scheme() {
        let err = FeedConfig::parse("ftp://example.com").unwrap_err();
        assert!(matches!(err, FeedError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn builder_setters_override_defaults() {
        let config = FeedConfig::parse("https://api.example.com")
            .unwrap()
            .with_poll_interval(Duration::from_millis(250))
            .with_request_timeout(Duration::from_secs(5));
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }
}
