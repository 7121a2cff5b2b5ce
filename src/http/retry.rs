//! Retry logic for network operations with linear backoff.

use std::future::Future;
use std::time::Duration;

use log::{debug, warn};

use super::error::ApiError;
use crate::config::ClientConfig;

/// Default number of attempts for one logical call.
pub const MAX_ATTEMPTS: usize = 3;

/// Default base delay between attempts in milliseconds.
pub const RETRY_DELAY_MS: u64 = 1000;

/// Attempt budget and backoff for one logical call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            base_delay: Duration::from_millis(RETRY_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.max_attempts, config.retry_base_delay)
    }

    /// Delay before resubmitting after the given (1-based) failed attempt.
    pub fn delay_for(&self, attempt: usize) -> Duration {
        self.base_delay
            .saturating_mul(u32::try_from(attempt).unwrap_or(u32::MAX))
    }
}

/// Executes an async operation with retry logic.
/// Only retries on connection failures, timeouts and server errors (5xx);
/// any other error is returned after the first attempt.
pub async fn with_retry<F, Fut, T>(
    policy: RetryPolicy,
    operation_name: &str,
    operation: F,
) -> Result<T, ApiError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if !e.is_retryable() {
                    debug!("{}: non-retryable error: {}", operation_name, e);
                    return Err(e);
                }

                if attempt >= policy.max_attempts {
                    warn!(
                        "{}: giving up after {} attempts ({})",
                        operation_name, attempt, e
                    );
                    return Err(e);
                }

                let delay = policy.delay_for(attempt);
                warn!(
                    "{}: attempt {}/{} failed ({}), retrying in {}ms...",
                    operation_name,
                    attempt,
                    policy.max_attempts,
                    e,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
