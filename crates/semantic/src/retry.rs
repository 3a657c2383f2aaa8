//! Retry with exponential backoff for transient embedding failures.
//!
//! Only the embedding client retries; the answer pipeline above it makes a
//! single call and relies on the outer timeout to bound the total wait.

use std::future::Future;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Configuration for retry behavior.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first call.
    pub max_retries: u32,
    /// Base delay between retries (doubled per attempt).
    #[serde(with = "crate::serde_millis", rename = "base_delay_ms")]
    pub base_delay: Duration,
    /// Upper bound for a single delay.
    #[serde(with = "crate::serde_millis", rename = "max_delay_ms")]
    pub max_delay: Duration,
    /// Whether to add 0-50% random jitter to delays.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Disable retries entirely.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }
}

/// Outcome of [`execute_with_retry_async`].
#[derive(Debug, Clone)]
pub struct RetryResult<T, E> {
    /// The final result (last error if every attempt failed).
    pub result: Result<T, E>,
    /// Number of attempts made (1 = no retries needed).
    pub attempts: u32,
    /// Wall time spent across all attempts and delays.
    pub total_duration: Duration,
}

impl<T, E> RetryResult<T, E> {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }

    pub fn into_result(self) -> Result<T, E> {
        self.result
    }
}

/// Run `operation` until it succeeds, returns a non-retryable error, or the
/// retry budget is spent. `operation` receives the zero-based attempt number.
///
/// ```ignore
/// let outcome = execute_with_retry_async(&cfg, EmbeddingError::is_retryable, |attempt| async move {
///     client.embed_once(text).await
/// })
/// .await;
/// ```
pub async fn execute_with_retry_async<T, E, F, Fut, R>(
    config: &RetryConfig,
    is_retryable: R,
    mut operation: F,
) -> RetryResult<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
{
    let start = Instant::now();
    let mut attempt = 0;

    loop {
        match operation(attempt).await {
            Ok(value) => {
                return RetryResult {
                    result: Ok(value),
                    attempts: attempt + 1,
                    total_duration: start.elapsed(),
                };
            }
            Err(error) => {
                if attempt >= config.max_retries || !is_retryable(&error) {
                    return RetryResult {
                        result: Err(error),
                        attempts: attempt + 1,
                        total_duration: start.elapsed(),
                    };
                }
                tokio::time::sleep(calculate_delay(config, attempt)).await;
                attempt += 1;
            }
        }
    }
}

/// Delay before retry number `attempt + 1`.
fn calculate_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let base = config.base_delay.as_millis() as u64;
    let exponential = base.saturating_mul(1_u64 << attempt.min(20));
    let delay = exponential.min(config.max_delay.as_millis() as u64);

    if config.jitter {
        let jitter = fastrand::u64(0..=delay / 2);
        Duration::from_millis(delay + jitter)
    } else {
        Duration::from_millis(delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn fast_config(max_retries: u32) -> RetryConfig {
        RetryConfig::default()
            .with_max_retries(max_retries)
            .with_base_delay(Duration::from_millis(1))
            .with_jitter(false)
    }

    #[tokio::test]
    async fn retry_succeeds_eventually() {
        let calls = Cell::new(0);
        let result = execute_with_retry_async(
            &fast_config(3),
            |_: &String| true,
            |_attempt| {
                calls.set(calls.get() + 1);
                let n = calls.get();
                async move {
                    if n < 3 {
                        Err("not yet".to_string())
                    } else {
                        Ok("success")
                    }
                }
            },
        )
        .await;

        assert!(result.succeeded());
        assert_eq!(result.attempts, 3);
        assert_eq!(result.into_result().unwrap(), "success");
    }

    #[tokio::test]
    async fn retry_fails_after_max_attempts() {
        let result: RetryResult<(), String> = execute_with_retry_async(
            &fast_config(2),
            |_: &String| true,
            |_attempt| async { Err("always fails".to_string()) },
        )
        .await;

        assert!(!result.succeeded());
        assert_eq!(result.attempts, 3);
        // two backoff sleeps of 1ms and 2ms
        assert!(result.total_duration >= Duration::from_millis(3));
    }

    #[tokio::test]
    async fn non_retryable_error_stops_immediately() {
        let result: RetryResult<(), String> = execute_with_retry_async(
            &fast_config(5),
            |e: &String| e != "fatal",
            |_attempt| async { Err("fatal".to_string()) },
        )
        .await;

        assert_eq!(result.attempts, 1);
        assert_eq!(result.into_result().unwrap_err(), "fatal");
    }

    #[tokio::test]
    async fn zero_retries_means_single_attempt() {
        let result: RetryResult<(), String> = execute_with_retry_async(
            &RetryConfig::none(),
            |_: &String| true,
            |_attempt| async { Err("boom".to_string()) },
        )
        .await;

        assert_eq!(result.attempts, 1);
    }

    #[test]
    fn delay_grows_exponentially_and_caps() {
        let cfg = RetryConfig::default()
            .with_base_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_millis(350))
            .with_jitter(false);

        assert_eq!(calculate_delay(&cfg, 0), Duration::from_millis(100));
        assert_eq!(calculate_delay(&cfg, 1), Duration::from_millis(200));
        assert_eq!(calculate_delay(&cfg, 2), Duration::from_millis(350));
        assert_eq!(calculate_delay(&cfg, 40), Duration::from_millis(350));
    }

    #[test]
    fn jitter_stays_within_half_delay() {
        let cfg = RetryConfig::default()
            .with_base_delay(Duration::from_millis(100))
            .with_jitter(true);

        for _ in 0..50 {
            let delay = calculate_delay(&cfg, 0);
            assert!(delay >= Duration::from_millis(100));
            assert!(delay <= Duration::from_millis(150));
        }
    }

    #[test]
    fn config_reads_millis_from_json() {
        let cfg: RetryConfig =
            serde_json::from_str(r#"{"max_retries": 4, "base_delay_ms": 25}"#).unwrap();
        assert_eq!(cfg.max_retries, 4);
        assert_eq!(cfg.base_delay, Duration::from_millis(25));
        assert_eq!(cfg.max_delay, RetryConfig::default().max_delay);
    }
}
