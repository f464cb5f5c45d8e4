//! Capped exponential backoff for requests that never reached the provider.

use std::time::{Duration, SystemTime};

use reqwest_retry::{RetryDecision, RetryPolicy, Retryable, RetryableStrategy};

const BASE_DELAY: Duration = Duration::from_secs(1);
const MAX_DELAY: Duration = Duration::from_secs(60);

/// Spaces out retries of failed connection attempts with doubling delays.
///
/// A `max_retries` of zero disables retrying entirely.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    max_retries: u32,
    base_delay: Duration,
    max_delay: Duration,
}

impl BackoffPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            base_delay: BASE_DELAY,
            max_delay: MAX_DELAY,
        }
    }

    fn delay_for(&self, past_retries: u32) -> Duration {
        let factor = 2_u32.saturating_pow(past_retries);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

impl RetryPolicy for BackoffPolicy {
    fn should_retry(&self, _request_start_time: SystemTime, n_past_retries: u32) -> RetryDecision {
        if n_past_retries >= self.max_retries {
            return RetryDecision::DoNotRetry;
        }
        RetryDecision::Retry {
            execute_after: SystemTime::now() + self.delay_for(n_past_retries),
        }
    }
}

/// Retries only when the connection could not be established.
///
/// Authorization codes and refresh tokens are single-use, and a meeting create
/// is not idempotent, so a request the provider may have seen is never resent.
/// Any response, 5xx included, and timeouts after connecting are final.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectFailureStrategy;

impl RetryableStrategy for ConnectFailureStrategy {
    fn handle(
        &self,
        res: &Result<reqwest::Response, reqwest_middleware::Error>,
    ) -> Option<Retryable> {
        match res {
            Ok(_) => None,
            Err(reqwest_middleware::Error::Reqwest(err)) if err.is_connect() => {
                Some(Retryable::Transient)
            }
            Err(_) => Some(Retryable::Fatal),
        }
    }
}
