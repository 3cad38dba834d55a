//! Retry logic for transient network errors.
//!
//! Provides capped exponential backoff for API requests that fail at the
//! transport level (connect errors, timeouts, broken bodies). Anything
//! else, including HTTP error statuses, is returned immediately.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can report whether retrying might help.
pub trait Transient {
    fn is_transient(&self) -> bool;
}

/// Backoff schedule for [`with_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts are `max_retries + 1`.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each later one.
    #[serde(with = "millis")]
    pub initial_delay: Duration,
    /// Upper bound on any single delay.
    #[serde(with = "millis")]
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the `failures`-th failed attempt (1-based).
    ///
    /// `initial * 2^(failures - 1)`, capped at `max_delay`.
    pub fn delay_for(&self, failures: u32) -> Duration {
        let exponent = failures.saturating_sub(1).min(31);
        self.initial_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Failure of an operation run through [`with_retry`].
#[derive(Debug, Error)]
pub enum RetryError<E: fmt::Display> {
    /// Every attempt failed with a transient error.
    #[error("Network error after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },

    /// A non-transient error stopped the retries.
    #[error("Unexpected error: {0}")]
    Fatal(E),
}

impl<E: fmt::Display> RetryError<E> {
    /// The underlying error from the final attempt.
    pub fn into_inner(self) -> E {
        match self {
            Self::Exhausted { last, .. } => last,
            Self::Fatal(e) => e,
        }
    }
}

/// Runs `operation` until it succeeds, fails fatally, or retries run out.
///
/// # Arguments
/// * `action` - Action name for logging
/// * `policy` - Retry budget and backoff
/// * `operation` - Closure that performs the request
pub async fn with_retry<T, E, F, Fut>(
    action: &str,
    policy: &RetryPolicy,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    E: Transient + fmt::Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut failures = 0u32;
    loop {
        match operation().await {
            Ok(value) => {
                if failures == 0 {
                    log::debug!("[Retry] {} succeeded on first try", action);
                } else {
                    log::info!("[Retry] {} succeeded after {} retries", action, failures);
                }
                return Ok(value);
            }
            Err(e) if e.is_transient() => {
                failures += 1;
                log::warn!("[Retry] {} attempt {} failed: {}", action, failures, e);
                if failures > policy.max_retries {
                    log::error!("[Retry] {} failed after {} attempts", action, failures);
                    return Err(RetryError::Exhausted {
                        attempts: failures,
                        last: e,
                    });
                }
                let delay = policy.delay_for(failures);
                log::info!(
                    "[Retry] Retrying {} (attempt {}/{}) after {}ms",
                    action,
                    failures + 1,
                    policy.max_retries + 1,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                log::error!("[Retry] {} failed with non-transient error: {}", action, e);
                return Err(RetryError::Fatal(e));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[derive(Debug, PartialEq)]
    enum TestError {
        Io(&'static str),
        Parse,
    }

    impl fmt::Display for TestError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            match self {
                Self::Io(msg) => write!(f, "io: {msg}"),
                Self::Parse => write!(f, "parse failure"),
            }
        }
    }

    impl Transient for TestError {
        fn is_transient(&self) -> bool {
            matches!(self, Self::Io(_))
        }
    }

    #[test]
    fn delay_doubles_and_caps() {
        let policy = RetryPolicy::default();
        let delays: Vec<_> = (1..=6).map(|n| policy.delay_for(n).as_millis()).collect();
        assert_eq!(delays, vec![500, 1000, 2000, 4000, 8000, 8000]);
        assert_eq!(policy.delay_for(200), Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let result = with_retry("fetch", &RetryPolicy::default(), || async {
            match calls.fetch_add(1, Ordering::SeqCst) {
                0 | 1 => Err(TestError::Io("reset")),
                _ => Ok(42),
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_millis(1500));
    }

    #[tokio::test(start_paused = true)]
    async fn stops_after_max_retries_plus_one() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = with_retry("fetch", &RetryPolicy::default(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(TestError::Io("timeout"))
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 6);
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Network error after 6 attempts: io: timeout");
        assert!(matches!(err, RetryError::Exhausted { attempts: 6, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn non_transient_error_is_not_retried() {
        let calls = AtomicU32::new(0);

        let result: Result<(), _> = with_retry("fetch", &RetryPolicy::default(), || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(TestError::Parse)
        })
        .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Unexpected error: parse failure");
        assert_eq!(err.into_inner(), TestError::Parse);
    }

    #[test]
    fn policy_reads_millis_from_json() {
        let policy: RetryPolicy =
            serde_json::from_str(r#"{ "max_retries": 2, "initial_delay": 100 }"#).unwrap();
        assert_eq!(policy.max_retries, 2);
        assert_eq!(policy.initial_delay, Duration::from_millis(100));
        assert_eq!(policy.max_delay, Duration::from_secs(8));
    }
}
