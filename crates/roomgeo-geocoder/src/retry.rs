//! Bounded retry with linear back-off for provider lookups.
//!
//! [`retry_with_backoff`] runs one provider attempt at a time. Transient
//! failures (network, timeout, non-success status, unreadable body) are
//! retried; an empty candidate list is terminal because asking again cannot
//! change the provider's answer.

use std::future::Future;
use std::time::Duration;

use crate::error::{GeocodeError, ProviderError};

/// How many times to retry and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure.
    pub max_retries: u32,
    /// Back-off unit: the n-th retry waits `n × backoff_unit`.
    pub backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_unit: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based).
    #[must_use]
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        self.backoff_unit.saturating_mul(retry)
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Returns `true` for attempt failures that are worth another try.
///
/// **Retriable:** transport failures and timeouts, non-success HTTP status,
/// bodies that do not parse, candidates with unreadable coordinates.
///
/// **Not retriable:** [`ProviderError::NoMatch`].
pub(crate) fn is_retriable(err: &ProviderError) -> bool {
    match err {
        ProviderError::Http(_)
        | ProviderError::UnexpectedStatus { .. }
        | ProviderError::Deserialize { .. }
        | ProviderError::MalformedCandidate(_) => true,
        ProviderError::NoMatch { .. } => false,
    }
}

/// Converts the final attempt failure into the caller-facing error.
fn into_terminal(err: ProviderError, attempts: u32) -> GeocodeError {
    match err {
        ProviderError::NoMatch { query } => GeocodeError::NoMatch { query },
        other => GeocodeError::ProviderUnavailable {
            attempts,
            reason: other.to_string(),
        },
    }
}

/// Runs `operation` until it succeeds, fails terminally, or the policy's
/// attempt budget is spent.
///
/// `operation` receives the 1-based attempt number. Back-off schedule with
/// the default policy (`backoff_unit = 1 s`, `max_retries = 2`):
///
/// | Attempt | Sleep before it |
/// |---------|-----------------|
/// | 1       | none            |
/// | 2       | 1 × 1 s         |
/// | 3       | 2 × 1 s         |
///
/// Exhaustion yields [`GeocodeError::ProviderUnavailable`]; an empty result
/// yields [`GeocodeError::NoMatch`] immediately.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    policy: RetryPolicy,
    mut operation: F,
) -> Result<T, GeocodeError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt > policy.max_retries {
                    return Err(into_terminal(err, attempt));
                }
                let delay = policy.delay_before_retry(attempt);
                tracing::warn!(
                    attempt,
                    max_retries = policy.max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "transient geocoding provider error, retrying after back-off"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;

    fn status_err() -> ProviderError {
        ProviderError::UnexpectedStatus {
            status: 503,
            url: "http://provider.test/search".to_owned(),
        }
    }

    fn policy(unit_ms: u64) -> RetryPolicy {
        RetryPolicy {
            max_retries: 2,
            backoff_unit: Duration::from_millis(unit_ms),
        }
    }

    #[test]
    fn delays_grow_linearly() {
        let p = policy(1000);
        assert_eq!(p.delay_before_retry(1), Duration::from_secs(1));
        assert_eq!(p.delay_before_retry(2), Duration::from_secs(2));
        assert_eq!(p.max_attempts(), 3);
    }

    #[test]
    fn no_match_is_not_retriable() {
        assert!(!is_retriable(&ProviderError::NoMatch {
            query: "x".to_owned()
        }));
        assert!(is_retriable(&status_err()));
        assert!(is_retriable(&ProviderError::MalformedCandidate(
            "lat".to_owned()
        )));
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(Mutex::new(0u32));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(policy(0), |_| {
            let c = Arc::clone(&c);
            async move {
                *c.lock().unwrap() += 1;
                Ok::<u32, ProviderError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn retries_then_succeeds() {
        let result = retry_with_backoff(policy(0), |attempt| async move {
            if attempt < 3 {
                Err(status_err())
            } else {
                Ok(attempt)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 3);
    }

    #[tokio::test]
    async fn no_match_stops_after_one_attempt() {
        let calls = Arc::new(Mutex::new(0u32));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(policy(0), |_| {
            let c = Arc::clone(&c);
            async move {
                *c.lock().unwrap() += 1;
                Err::<u32, _>(ProviderError::NoMatch {
                    query: "Nonexistent Place Zzz".to_owned(),
                })
            }
        })
        .await;
        assert_eq!(*calls.lock().unwrap(), 1, "NoMatch must not be retried");
        assert!(matches!(result, Err(GeocodeError::NoMatch { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn exhaustion_follows_linear_schedule() {
        let unit = Duration::from_millis(1000);
        let starts = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&starts);
        let result = retry_with_backoff(policy(1000), |_| {
            let s = Arc::clone(&s);
            async move {
                s.lock().unwrap().push(Instant::now());
                Err::<u32, _>(status_err())
            }
        })
        .await;

        match result {
            Err(GeocodeError::ProviderUnavailable { attempts, reason }) => {
                assert_eq!(attempts, 3);
                assert!(reason.contains("503"), "reason: {reason}");
            }
            other => panic!("expected ProviderUnavailable, got {other:?}"),
        }

        let starts = starts.lock().unwrap();
        assert_eq!(starts.len(), 3);
        let slack = Duration::from_millis(5);
        let first_gap = starts[1] - starts[0];
        let second_gap = starts[2] - starts[1];
        assert!(first_gap >= unit && first_gap < unit + slack, "gap 1: {first_gap:?}");
        assert!(
            second_gap >= unit * 2 && second_gap < unit * 2 + slack,
            "gap 2: {second_gap:?}"
        );
    }

    #[tokio::test]
    async fn zero_retries_means_single_attempt() {
        let p = RetryPolicy {
            max_retries: 0,
            backoff_unit: Duration::ZERO,
        };
        let result = retry_with_backoff(p, |_| async { Err::<u32, _>(status_err()) }).await;
        assert!(matches!(
            result,
            Err(GeocodeError::ProviderUnavailable { attempts: 1, .. })
        ));
    }
}
