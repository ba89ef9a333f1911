use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Configuration for paced retries
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (including the first one)
    pub max_attempts: u32,
    /// Fixed pause taken before every attempt, the first included
    pub delay: Duration,
}

impl RetryConfig {
    /// Create a new retry configuration; zero attempts is raised to one
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

/// Execute an async operation with paced retries
///
/// `on_error` sees every failed attempt (1-indexed) before the next one starts.
/// An `Ok` ends the loop immediately, whatever it contains.
///
/// # Returns
/// The first successful result, or the last error once all attempts failed
pub async fn with_retry<T, E, F, Fut, O>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
    mut on_error: O,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    O: FnMut(u32, &E),
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        if !config.delay.is_zero() {
            debug!(
                "{}: Attempt {}/{} after {:?}",
                operation_name, attempt, max_attempts, config.delay
            );
            sleep(config.delay).await;
        }

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(
                        "{}: Succeeded on attempt {}/{}",
                        operation_name, attempt, max_attempts
                    );
                }
                return Ok(result);
            }
            Err(e) => {
                on_error(attempt, &e);

                let remaining = max_attempts - attempt;
                if remaining == 0 {
                    warn!(
                        "{}: All {} attempts failed. Last error: {}",
                        operation_name, max_attempts, e
                    );
                    return Err(e);
                }

                warn!(
                    "{}: Attempt {}/{} failed ({}), {} retries remaining",
                    operation_name, attempt, max_attempts, e, remaining
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast(max_attempts: u32) -> RetryConfig {
        RetryConfig::new(max_attempts, Duration::ZERO)
    }

    #[test]
    fn test_retry_config_new() {
        let config = RetryConfig::new(5, Duration::from_millis(200));
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.delay, Duration::from_millis(200));
    }

    #[test]
    fn test_zero_attempts_raised_to_one() {
        assert_eq!(RetryConfig::new(0, Duration::ZERO).max_attempts, 1);
    }

    #[tokio::test]
    async fn test_with_retry_succeeds_first_attempt() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        let mut failures = Vec::new();

        let result: Result<u32, &str> = with_retry(
            &fast(3),
            "test",
            || {
                let c = counter_clone.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                }
            },
            |attempt, e: &&str| failures.push((attempt, e.to_string())),
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(failures.is_empty());
    }

    #[tokio::test]
    async fn test_with_retry_succeeds_after_failures() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        let mut failures = Vec::new();

        let result: Result<u32, &str> = with_retry(
            &fast(5),
            "test",
            || {
                let c = counter_clone.clone();
                async move {
                    let attempt = c.fetch_add(1, Ordering::SeqCst);
                    if attempt < 2 {
                        Err("temporary failure")
                    } else {
                        Ok(42)
                    }
                }
            },
            |attempt, _e: &&str| failures.push(attempt),
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(failures, vec![1, 2]);
    }

    #[tokio::test]
    async fn test_with_retry_all_attempts_fail() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();
        let mut failures = 0;

        let result: Result<u32, &str> = with_retry(
            &fast(3),
            "test",
            || {
                let c = counter_clone.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err("permanent failure")
                }
            },
            |_, _: &&str| failures += 1,
        )
        .await;

        assert_eq!(result.unwrap_err(), "permanent failure");
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert_eq!(failures, 3);
    }

    #[tokio::test]
    async fn test_with_retry_ok_value_stops_loop_even_if_empty() {
        let counter = Arc::new(AtomicU32::new(0));
        let counter_clone = counter.clone();

        let result: Result<Vec<String>, &str> = with_retry(
            &fast(5),
            "test",
            || {
                let c = counter_clone.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Ok(Vec::new())
                }
            },
            |_, _: &&str| {},
        )
        .await;

        assert!(result.unwrap().is_empty());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_retry_paces_every_attempt() {
        let config = RetryConfig::new(3, Duration::from_millis(200));
        let start = tokio::time::Instant::now();

        let result: Result<(), &str> =
            with_retry(&config, "paced", || async { Err("down") }, |_, _: &&str| {}).await;

        assert!(result.is_err());
        assert!(start.elapsed() >= Duration::from_millis(600));
    }
}
