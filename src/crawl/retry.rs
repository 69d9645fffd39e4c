//! Bounded retry for per-property work
//!
//! A property fetch-and-extract either succeeds, exhausts its attempt
//! budget, or dies immediately on a permanent error. The distinction lives
//! in the [`Retryable`] classification that the error types implement
//! themselves; the retry loop only consumes it.

use std::fmt::Display;
use std::future::Future;

/// Classifies an error by whether running the operation again can help
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

/// A terminally failed operation: the last error plus the attempts it consumed
#[derive(Debug)]
pub struct RetryFailure<E> {
    pub error: E,
    pub attempts: u32,
}

/// Runs `operation` until it succeeds or its attempt budget is spent
///
/// Retryable errors consume attempts, one attempt per call; a permanent
/// error ends the loop at once, whatever the remaining budget. Every failed
/// attempt is logged together with `subject` and the attempts left, so a
/// long crawl shows which URLs are struggling. There is no backoff between
/// attempts; spacing is the rate limiter's job.
///
/// # Arguments
///
/// * `subject` - What is being attempted, for log lines (typically a URL)
/// * `max_attempts` - Total attempt budget, including the first try
/// * `operation` - The fallible operation, re-invoked per attempt
///
/// # Returns
///
/// * `Ok(T)` - An attempt succeeded
/// * `Err(RetryFailure<E>)` - The final error and the attempts consumed
pub async fn with_retries<T, E, F, Fut>(
    subject: &str,
    max_attempts: u32,
    mut operation: F,
) -> Result<T, RetryFailure<E>>
where
    E: Retryable + Display,
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) if attempt < max_attempts && error.is_retryable() => {
                tracing::warn!(
                    "Attempt {} for {} failed: {} ({} attempts left)",
                    attempt,
                    subject,
                    error,
                    max_attempts - attempt
                );
                attempt += 1;
            }
            Err(error) => return Err(RetryFailure { error, attempts: attempt }),
        }
    }
}
