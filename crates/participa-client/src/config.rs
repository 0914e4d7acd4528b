use std::time::Duration;

/// Development instance, tried first.
pub const LOCAL_API_URL: &str = "http://localhost:8000";
/// Public production instance.
pub const PRODUCTION_API_URL: &str = "https://marinhothiago-participa-df-pii.hf.space";

/// Per-attempt ceiling. The model may be mid-inference.
pub const API_TIMEOUT: Duration = Duration::from_secs(15);
pub const LOCAL_DETECTION_TIMEOUT: Duration = Duration::from_secs(2);
pub const CONNECTION_CHECK_TIMEOUT: Duration = Duration::from_secs(8);
pub const MAX_RETRIES: u32 = 1;

/// Retry budget and backoffs for one logical request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries shared across all failure classes of a request.
    pub max_retries: u32,
    /// Wait before retrying a 502/503.
    pub waking_up_backoff: Duration,
    /// Wait before retrying a network failure.
    pub offline_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            waking_up_backoff: Duration::from_secs(3),
            offline_backoff: Duration::from_secs(2),
        }
    }
}

/// Everything the client needs to know before its first request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub local_url: String,
    pub remote_url: String,
    pub request_timeout: Duration,
    pub probe_timeout: Duration,
    pub connection_check_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            local_url: LOCAL_API_URL.to_string(),
            remote_url: PRODUCTION_API_URL.to_string(),
            request_timeout: API_TIMEOUT,
            probe_timeout: LOCAL_DETECTION_TIMEOUT,
            connection_check_timeout: CONNECTION_CHECK_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

/// Join a base URL and a path with exactly one slash between them.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{path}")
    } else {
        format!("{base}/{path}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_contract() {
        let config = ClientConfig::default();
        assert_eq!(config.local_url, "http://localhost:8000");
        assert_eq!(config.request_timeout, Duration::from_secs(15));
        assert_eq!(config.probe_timeout, Duration::from_secs(2));
        assert_eq!(config.connection_check_timeout, Duration::from_secs(8));
        assert_eq!(config.retry.max_retries, 1);
    }

    #[test]
    fn join_url_normalizes_slashes() {
        assert_eq!(join_url("http://localhost:8000/", "/analyze"), "http://localhost:8000/analyze");
        assert_eq!(join_url("http://localhost:8000", "health"), "http://localhost:8000/health");
        assert_eq!(join_url("http://x//", "/a/b"), "http://x/a/b");
    }
}
