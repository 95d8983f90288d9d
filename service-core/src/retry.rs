//! Retry utilities for outbound calls to third-party APIs.
//!
//! Provides bounded retry with exponential backoff. Callers decide which
//! failures are transient by passing a classifier.

use rand::Rng;
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Configuration for retry behavior.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (not including the initial attempt).
    pub max_retries: u32,
    /// Initial backoff duration before first retry.
    pub initial_backoff: Duration,
    /// Maximum backoff duration.
    pub max_backoff: Duration,
    /// Backoff multiplier for exponential backoff.
    pub backoff_multiplier: f64,
    /// Whether to add jitter to backoff duration.
    pub add_jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            add_jitter: true,
        }
    }
}

impl RetryConfig {
    /// Create a new retry config with the specified max retries.
    pub fn with_max_retries(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Default::default()
        }
    }

    /// Create a config with no retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Calculate backoff duration for a given attempt.
    pub fn backoff_duration(&self, attempt: u32) -> Duration {
        let backoff =
            self.initial_backoff.as_millis() as f64 * self.backoff_multiplier.powi(attempt as i32);
        let backoff_ms = backoff.min(self.max_backoff.as_millis() as f64) as u64;

        let mut duration = Duration::from_millis(backoff_ms);

        if self.add_jitter {
            // Up to 25% jitter
            let jitter = (backoff_ms as f64 * 0.25 * rand::thread_rng().gen::<f64>()) as u64;
            duration += Duration::from_millis(jitter);
        }

        duration
    }

    /// Delay before retry `attempt`: the backoff schedule, raised to the
    /// server hint when one is given. The hint is capped at `max_backoff`.
    pub fn delay_for(&self, attempt: u32, hint: Option<Duration>) -> Duration {
        let backoff = self.backoff_duration(attempt);
        match hint {
            Some(hint) => backoff.max(hint.min(self.max_backoff)),
            None => backoff,
        }
    }
}

/// Execute an async operation, retrying transient failures with backoff.
///
/// `is_retryable` classifies an error as transient. Permanent errors and the
/// error of the final attempt are returned unchanged.
pub async fn retry_with_backoff<F, Fut, T, E, C>(
    config: &RetryConfig,
    operation_name: &str,
    is_retryable: C,
    f: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> bool,
    E: Display,
{
    retry_with_backoff_hint(config, operation_name, is_retryable, |_| None, f).await
}

/// Like [`retry_with_backoff`], but `retry_after` may extract a server
/// requested delay from the error, which becomes a lower bound on the sleep.
pub async fn retry_with_backoff_hint<F, Fut, T, E, C, H>(
    config: &RetryConfig,
    operation_name: &str,
    is_retryable: C,
    retry_after: H,
    mut f: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    C: Fn(&E) -> bool,
    H: Fn(&E) -> Option<Duration>,
    E: Display,
{
    let mut attempt = 0;

    loop {
        match f().await {
            Ok(result) => {
                if attempt > 0 {
                    info!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        "Call succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(err) => {
                if !is_retryable(&err) {
                    return Err(err);
                }

                if attempt >= config.max_retries {
                    warn!(
                        operation = operation_name,
                        attempt = attempt + 1,
                        error = %err,
                        "Call failed after max retries"
                    );
                    return Err(err);
                }

                let backoff = config.delay_for(attempt, retry_after(&err));
                warn!(
                    operation = operation_name,
                    attempt = attempt + 1,
                    error = %err,
                    backoff_ms = backoff.as_millis() as u64,
                    "Call failed, retrying after backoff"
                );

                sleep(backoff).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast() -> RetryConfig {
        RetryConfig {
            max_retries: 2,
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
            backoff_multiplier: 2.0,
            add_jitter: false,
        }
    }

    #[test]
    fn test_retry_config_default() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_backoff, Duration::from_millis(100));
        assert_eq!(RetryConfig::no_retry().max_retries, 0);
        assert_eq!(RetryConfig::with_max_retries(7).max_retries, 7);
    }

    #[test]
    fn test_backoff_duration() {
        let config = RetryConfig {
            add_jitter: false,
            ..Default::default()
        };

        assert_eq!(config.backoff_duration(0), Duration::from_millis(100));
        assert_eq!(config.backoff_duration(1), Duration::from_millis(200));
        assert_eq!(config.backoff_duration(2), Duration::from_millis(400));
        assert_eq!(config.backoff_duration(20), Duration::from_secs(10));
    }

    #[test]
    fn test_delay_honours_server_hint() {
        let config = RetryConfig {
            add_jitter: false,
            ..Default::default()
        };

        assert_eq!(config.delay_for(0, None), Duration::from_millis(100));
        assert_eq!(
            config.delay_for(0, Some(Duration::from_secs(3))),
            Duration::from_secs(3)
        );
        assert_eq!(
            config.delay_for(2, Some(Duration::from_millis(50))),
            Duration::from_millis(400)
        );
        assert_eq!(
            config.delay_for(0, Some(Duration::from_secs(120))),
            Duration::from_secs(10)
        );
    }

    #[tokio::test]
    async fn test_retry_uses_hint_from_error() {
        let calls = AtomicU32::new(0);
        let hints = AtomicU32::new(0);
        let result = retry_with_backoff_hint(
            &fast(),
            "test_op",
            |_: &String| true,
            |_: &String| {
                hints.fetch_add(1, Ordering::SeqCst);
                Some(Duration::from_millis(1))
            },
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err("slow down".to_string())
                    } else {
                        Ok(n)
                    }
                }
            },
        )
        .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(hints.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_success_first_attempt() {
        let result =
            retry_with_backoff(&fast(), "test_op", |_: &String| true, || async {
                Ok::<_, String>(42)
            })
            .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_transient_failure() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(&fast(), "test_op", |_: &String| true, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err("unavailable".to_string())
                } else {
                    Ok(n)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_retry_permanent_failure() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(&fast(), "test_op", |_: &String| false, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<i32, _>("not found".to_string()) }
        })
        .await;
        assert_eq!(result.unwrap_err(), "not found");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_retries() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(&fast(), "test_op", |_: &String| true, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<i32, _>("rate limited".to_string()) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
