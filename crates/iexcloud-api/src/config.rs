//! Client configuration and IEX Cloud request-limit defaults.

use std::time::Duration;

use iexcloud_fetch::{HttpResponseCode, RetryBehavior};
use iexcloud_types::DataType;

/// Production API host.
pub const CLOUD_BASE_URL: &str = "https://cloud.iexapis.com/";

/// Sandbox API host.
pub const SANDBOX_BASE_URL: &str = "https://sandbox.iexapis.com/";

/// Minimum spacing between requests that keeps a client under the
/// per-second request ceiling.
///
/// See <https://iexcloud.io/docs/api/#request-limits>.
pub const DEFAULT_REQUEST_LIMIT_TIMEOUT: Duration = Duration::from_millis(40);

/// Status returned when the request ceiling is exceeded.
pub const HTTP_TOO_MANY_REQUESTS: HttpResponseCode = 429;

/// Most symbols accepted by one market batch request.
pub const MAX_SYMBOLS_PER_BATCH: usize = 100;

/// The policy requests start out with: up to three retries on 429 or an
/// empty body, spaced by [`DEFAULT_REQUEST_LIMIT_TIMEOUT`].
#[must_use]
pub fn default_retry_behavior() -> RetryBehavior {
    RetryBehavior::default()
        .with_max_retries(3)
        .with_responses_to_retry([HTTP_TOO_MANY_REQUESTS])
        .with_retry_if_empty(true)
        .with_timeout(DEFAULT_REQUEST_LIMIT_TIMEOUT)
}

/// Configuration for [`IexClient`](crate::IexClient).
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL for [`DataType::Authentic`] requests, with a trailing slash.
    pub cloud_base_url: String,
    /// Base URL for [`DataType::Sandbox`] requests, with a trailing slash.
    pub sandbox_base_url: String,
    /// Maximum parallel transfers when a call spans several batches.
    /// Zero means no limit.
    pub max_connections: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            cloud_base_url: CLOUD_BASE_URL.to_string(),
            sandbox_base_url: SANDBOX_BASE_URL.to_string(),
            max_connections: 0,
        }
    }
}

impl ApiConfig {
    /// Points both data types at the same host. Mostly useful for tests.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            cloud_base_url: base_url.clone(),
            sandbox_base_url: base_url,
            ..Self::default()
        }
    }

    /// Returns the host for the given data type.
    #[must_use]
    pub fn base_url(&self, data_type: DataType) -> &str {
        match data_type {
            DataType::Authentic => &self.cloud_base_url,
            DataType::Sandbox => &self.sandbox_base_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_retry_behavior() {
        let policy = default_retry_behavior();
        assert_eq!(policy.max_retries, 3);
        assert!(policy.responses_to_retry.contains(&429));
        assert_eq!(policy.responses_to_retry.len(), 1);
        assert!(policy.retry_if_empty_response_data);
        assert_eq!(policy.timeout, Duration::from_millis(40));
    }

    #[test]
    fn test_base_url_by_data_type() {
        let config = ApiConfig::default();
        assert_eq!(config.base_url(DataType::Authentic), "https://cloud.iexapis.com/");
        assert_eq!(config.base_url(DataType::Sandbox), "https://sandbox.iexapis.com/");

        let local = ApiConfig::with_base_url("http://127.0.0.1:9000/");
        assert_eq!(local.base_url(DataType::Sandbox), "http://127.0.0.1:9000/");
    }
}
