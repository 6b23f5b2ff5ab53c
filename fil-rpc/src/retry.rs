// fil-rpc/src/retry.rs
use std::time::Duration;
use rand::Rng;
use futures::Future;
use serde::{Deserialize, Serialize};

use crate::errors::TransportError;

/// Configuration for bounded retry behavior
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first call
    pub max_retries: u32,

    /// Backoff before the first retry
    #[serde(with = "millis")]
    pub initial_backoff: Duration,

    /// Upper bound on the backoff between attempts
    #[serde(with = "millis")]
    pub max_backoff: Duration,

    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,

    /// Factor to apply random jitter (0-1)
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

/// Executes an async RPC operation with retry logic
///
/// Only connection failures and timeouts are retried. Anything else is
/// returned on the first occurrence, as is the last error once
/// `max_retries` is exhausted.
pub async fn with_retry<F, Fut, T>(
    mut operation: F,
    config: &RetryConfig,
) -> Result<T, TransportError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TransportError>>,
{
    let mut current_retry = 0;
    let mut current_backoff = config.initial_backoff;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(error) => {
                if current_retry >= config.max_retries || !error.is_retryable() {
                    return Err(error);
                }

                let jitter_range = (current_backoff.as_millis() as f64 * config.jitter_factor) as u64;
                let jitter = if jitter_range > 0 {
                    rand::thread_rng().gen_range(0..jitter_range)
                } else {
                    0
                };

                let sleep_duration = current_backoff.saturating_add(Duration::from_millis(jitter));
                log::debug!(
                    "Retry {}/{} after {:?}: {}",
                    current_retry + 1,
                    config.max_retries,
                    sleep_duration,
                    error
                );
                tokio::time::sleep(sleep_duration).await;

                current_retry += 1;

                let next_backoff_millis = current_backoff.as_millis() as f64 * config.backoff_multiplier;
                current_backoff = Duration::from_millis(
                    next_backoff_millis.min(config.max_backoff.as_millis() as f64) as u64
                );
            }
        }
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_config() -> RetryConfig {
        RetryConfig {
            max_retries: 3,
            initial_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(100),
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }

    #[tokio::test]
    async fn test_successful_operation() {
        let attempt_counter = Arc::new(AtomicU32::new(0));

        let counter = attempt_counter.clone();
        let operation = move || {
            let counter_clone = counter.clone();
            async move {
                counter_clone.fetch_add(1, Ordering::SeqCst);
                Ok::<_, TransportError>("success")
            }
        };

        let result = with_retry(operation, &fast_config()).await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(attempt_counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_until_success() {
        let attempt_counter = Arc::new(AtomicU32::new(0));

        let counter = attempt_counter.clone();
        let operation = move || {
            let counter_clone = counter.clone();
            async move {
                let attempts = counter_clone.fetch_add(1, Ordering::SeqCst);

                if attempts < 2 {
                    Err(TransportError::Connect("connection refused".to_string()))
                } else {
                    Ok::<_, TransportError>("success")
                }
            }
        };

        let result = with_retry(operation, &fast_config()).await;

        assert_eq!(result.unwrap(), "success");
        assert_eq!(attempt_counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_max_retries_exceeded() {
        let attempt_counter = Arc::new(AtomicU32::new(0));

        let counter = attempt_counter.clone();
        let operation = move || {
            let counter_clone = counter.clone();
            async move {
                counter_clone.fetch_add(1, Ordering::SeqCst);
                Err::<String, _>(TransportError::Timeout(10))
            }
        };

        let config = fast_config();
        let result = with_retry(operation, &config).await;

        assert!(matches!(result, Err(TransportError::Timeout(_))));
        assert_eq!(attempt_counter.load(Ordering::SeqCst), config.max_retries + 1);
    }

    #[tokio::test]
    async fn test_non_retryable_error() {
        let attempt_counter = Arc::new(AtomicU32::new(0));

        let counter = attempt_counter.clone();
        let operation = move || {
            let counter_clone = counter.clone();
            async move {
                counter_clone.fetch_add(1, Ordering::SeqCst);
                Err::<String, _>(TransportError::Decode("not json".to_string()))
            }
        };

        let result = with_retry(operation, &fast_config()).await;

        assert!(result.is_err());
        assert_eq!(attempt_counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_config_from_partial_json() {
        let config: RetryConfig = serde_json::from_str(r#"{"max_retries": 7, "initial_backoff": 250}"#).unwrap();
        assert_eq!(config.max_retries, 7);
        assert_eq!(config.initial_backoff, Duration::from_millis(250));
        assert_eq!(config.max_backoff, Duration::from_secs(10));
    }
}
