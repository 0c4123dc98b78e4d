//! Bounded retry for remote calls.
//!
//! Fixed attempt count, fixed linear delay. No exponential backoff, no
//! jitter, no circuit breaker, and no retryable/non-retryable distinction:
//! every remote error is retried, and after the last attempt the caller
//! falls back to the local cache.

use std::time::Duration;

use crate::config::SyncConfig;

/// Retry policy for remote operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Create a policy. At least one attempt is always made.
    #[must_use]
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    /// Number of attempts per operation.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Fixed delay between attempts.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `operation` up to `attempts` times, sleeping `delay` between
    /// failures. Returns the first success, or the last error.
    pub async fn run<T, E, F, Fut>(&self, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if attempt < self.attempts => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.attempts,
                        error = %e,
                        "remote attempt failed, retrying after fixed delay"
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        attempts = self.attempts,
                        error = %e,
                        "remote attempts exhausted"
                    );
                    return Err(e);
                }
            }
        }
    }
}

impl From<SyncConfig> for RetryPolicy {
    fn from(config: SyncConfig) -> Self {
        Self::new(config.retry_attempts, config.retry_delay)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_first_attempt() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1000));
        let calls = AtomicU32::new(0);

        let result: Result<u32, String> = policy
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(7) }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_then_succeeds() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1000));
        let calls = AtomicU32::new(0);

        let result: Result<&str, String> = policy
            .run(|| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err("flaky".to_string())
                    } else {
                        Ok("recovered")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_attempts() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1000));
        let calls = AtomicU32::new(0);

        let result: Result<(), String> = policy
            .run(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err("down".to_string()) }
            })
            .await;

        assert_eq!(result.unwrap_err(), "down");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_linear_delay() {
        let policy = RetryPolicy::new(3, Duration::from_millis(1000));
        let start = tokio::time::Instant::now();

        let _: Result<(), String> = policy.run(|| async { Err("down".to_string()) }).await;

        // Two sleeps between three attempts, fixed delay each
        assert_eq!(start.elapsed(), Duration::from_millis(2000));
    }

    #[test]
    fn test_zero_attempts_clamped_to_one() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.attempts(), 1);
    }
}
