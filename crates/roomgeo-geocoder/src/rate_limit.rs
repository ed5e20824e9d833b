//! Process-wide spacing of outbound provider calls.
//!
//! Public geocoding providers allow roughly one request per second per client
//! and throttle or block clients that exceed it. A single [`RateLimiter`] is
//! shared (via `Arc`) by every [`GeocodeClient`](crate::GeocodeClient) in the
//! process.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum interval between the starts of consecutive permitted
/// operations.
///
/// The last start time sits behind a `tokio` mutex that is held across the
/// wait. Concurrent callers therefore proceed one at a time, in the order
/// they started waiting (the mutex is FIFO-fair).
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_start: Mutex<Option<Instant>>,
    granted: AtomicU64,
}

impl RateLimiter {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_start: Mutex::new(None),
            granted: AtomicU64::new(0),
        }
    }

    /// A limiter that never waits. Permits are still counted.
    #[must_use]
    pub fn unlimited() -> Self {
        Self::new(Duration::ZERO)
    }

    /// Number of permits handed out so far.
    #[must_use]
    pub fn granted(&self) -> u64 {
        self.granted.load(Ordering::Relaxed)
    }

    /// Suspends until the caller may start its operation.
    pub async fn acquire(&self) {
        let mut last_start = self.last_start.lock().await;

        if let Some(previous) = *last_start {
            let ready_at = previous + self.min_interval;
            let now = Instant::now();
            if ready_at > now {
                tracing::debug!(
                    wait_ms = u64::try_from((ready_at - now).as_millis()).unwrap_or(u64::MAX),
                    "rate limiter holding request"
                );
                tokio::time::sleep_until(ready_at).await;
            }
        }

        *last_start = Some(Instant::now());
        self.granted.fetch_add(1, Ordering::Relaxed);
    }
}
