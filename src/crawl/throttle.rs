//! Request pacing
//!
//! Listing sites get one shared politeness budget per crawl run: a minimum
//! delay between successive property requests, no matter how many workers
//! are fetching. The limiter serializes departures, so raising the worker
//! count overlaps page processing without raising the request rate.

use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum delay between successive request departures
///
/// All workers share one limiter. `acquire` holds the slot while waiting,
/// so concurrent callers queue up and each departure is spaced by the full
/// delay from the previous one.
pub struct RateLimiter {
    delay: Duration,
    last_departure: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter with the given minimum delay between departures
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_departure: Mutex::new(None),
        }
    }

    /// Waits until the delay since the previous departure has elapsed,
    /// then claims this departure slot
    pub async fn acquire(&self) {
        let mut last = self.last_departure.lock().await;

        if let Some(previous) = *last {
            let ready_at = previous + self.delay;
            if ready_at > Instant::now() {
                tokio::time::sleep_until(ready_at).await;
            }
        }

        *last = Some(Instant::now());
    }
}
