//! Retry policy for upstream API requests.

use std::time::Duration;

use reqwest::{Method, StatusCode};

/// Exponential backoff for idempotent requests.
///
/// Attempt `n` (1-based) that fails with a retryable outcome waits
/// `base_delay * factor^(n-1)`, capped at `max_delay`, before attempt `n + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay after the first failed attempt.
    pub base_delay: Duration,
    /// Multiplier applied per attempt.
    pub factor: u32,
    /// Upper bound for any single delay, including `Retry-After`.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            factor: 2,
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub fn never() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay to wait after failed attempt number `attempt` (1-based).
    ///
    /// A server-provided `Retry-After` replaces the computed delay but is still
    /// capped.
    #[must_use]
    pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let delay = retry_after.unwrap_or_else(|| {
            let exponent = attempt.saturating_sub(1);
            let multiplier = self.factor.checked_pow(exponent).unwrap_or(u32::MAX);
            self.base_delay.saturating_mul(multiplier)
        });
        delay.min(self.max_delay)
    }

    /// Attempts allowed for a request with this method.
    #[must_use]
    pub fn attempts_for(&self, method: &Method) -> u32 {
        if is_idempotent(method) {
            self.max_attempts.max(1)
        } else {
            1
        }
    }
}

/// Methods that can be repeated without changing the result.
#[must_use]
pub fn is_idempotent(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::PUT | Method::DELETE | Method::OPTIONS
    )
}

/// Statuses worth another attempt: server errors, request timeout and rate
/// limiting. Every other 4xx is final.
#[must_use]
pub fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}
