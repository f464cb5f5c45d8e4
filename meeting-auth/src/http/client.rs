//! Builder for the middleware-wrapped client used for every provider call.

use std::time::Duration;

use reqwest_middleware::ClientBuilder;
use reqwest_retry::RetryTransientMiddleware;

use super::{BackoffPolicy, ConnectFailureStrategy};

/// Timeout and retry settings for outbound provider calls.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpClientConfig {
    /// Whole-request timeout, connect included.
    pub timeout: Duration,
    /// Retries for failed connection attempts; zero disables retrying.
    pub max_retries: u32,
    pub user_agent: String,
}

impl HttpClientConfig {
    pub fn new(timeout: Duration, max_retries: u32) -> Self {
        Self {
            timeout,
            max_retries,
            ..Self::default()
        }
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
            user_agent: format!("zoom-relay/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP client with connect-retry middleware. Cheap to clone; clones share a pool.
pub type AuthenticatedClient = reqwest_middleware::ClientWithMiddleware;

/// Builds an [`AuthenticatedClient`].
///
/// Credentials are not baked into the client: the OAuth provider sets Basic
/// auth on token requests and the meeting client sets a bearer token per call.
#[derive(Debug, Default)]
pub struct AuthenticatedClientBuilder {
    config: HttpClientConfig,
}

impl AuthenticatedClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: HttpClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    pub fn build(self) -> Result<AuthenticatedClient, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(self.config.timeout)
            .user_agent(self.config.user_agent)
            .build()?;

        let mut builder = ClientBuilder::new(client);
        if self.config.max_retries > 0 {
            let policy = BackoffPolicy::new(self.config.max_retries);
            builder = builder.with(RetryTransientMiddleware::new_with_policy_and_strategy(
                policy,
                ConnectFailureStrategy,
            ));
        }

        Ok(builder.build())
    }
}
