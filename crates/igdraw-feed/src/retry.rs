//! Exponential backoff for transient sheet fetch failures.
//!
//! Network failures and HTTP 429 are retried. Everything else (bad status,
//! malformed payload, gviz query errors) is returned on the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::FeedError;

/// Returns `true` if `err` is worth another attempt after a delay.
fn is_retriable(err: &FeedError) -> bool {
    matches!(err, FeedError::RateLimited { .. } | FeedError::Http(_))
}

/// Seconds to wait before retrying after `err` on zero-based `attempt`.
///
/// A rate-limited response waits at least as long as its `Retry-After`.
fn retry_delay_secs(err: &FeedError, attempt: u32, backoff_base_secs: u64) -> u64 {
    let backoff = backoff_base_secs.saturating_mul(1u64 << attempt.min(62));
    match err {
        FeedError::RateLimited { retry_after_secs } => backoff.max(*retry_after_secs),
        _ => backoff,
    }
}

/// Runs `operation`, retrying transient errors up to `max_retries` extra
/// times. The wait before retry `n` (1-based) is
/// `backoff_base_secs * 2^(n-1)` seconds, or the server's `Retry-After` when
/// that is longer; the last error is returned once retries are exhausted.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, FeedError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FeedError>>,
{
    let mut attempt = 0u32;

    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };
        if !is_retriable(&err) || attempt >= max_retries {
            return Err(err);
        }

        let delay_secs = retry_delay_secs(&err, attempt, backoff_base_secs);
        tracing::warn!(
            attempt,
            max_retries,
            delay_secs,
            error = %err,
            "transient feed error, retrying after backoff"
        );
        tokio::time::sleep(Duration::from_secs(delay_secs)).await;
        attempt += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn rate_limited() -> FeedError {
        FeedError::RateLimited {
            retry_after_secs: 0,
        }
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, FeedError>(7)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_on_rate_limited_then_succeeds() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                let n = cc.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(rate_limited())
                } else {
                    Ok::<u32, FeedError>(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn propagates_last_error_after_exhausting_retries() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(1, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, FeedError>(rate_limited())
            }
        })
        .await;
        assert_eq!(call_count.load(Ordering::SeqCst), 2);
        assert!(matches!(result, Err(FeedError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn does_not_retry_sheet_error() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, FeedError>(FeedError::Sheet("access denied".to_owned()))
            }
        })
        .await;
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(FeedError::Sheet(_))));
    }

    #[tokio::test]
    async fn does_not_retry_unexpected_status() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = Arc::clone(&call_count);
        let result = retry_with_backoff(3, 0, || {
            let cc = Arc::clone(&cc);
            async move {
                cc.fetch_add(1, Ordering::SeqCst);
                Err::<u32, FeedError>(FeedError::UnexpectedStatus {
                    status: 500,
                    url: "https://docs.example.com/sheet".to_owned(),
                })
            }
        })
        .await;
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
        assert!(matches!(
            result,
            Err(FeedError::UnexpectedStatus { status: 500, .. })
        ));
    }

    #[test]
    fn delay_doubles_per_attempt() {
        let err = FeedError::Sheet("x".to_owned());
        assert_eq!(retry_delay_secs(&err, 0, 2), 2);
        assert_eq!(retry_delay_secs(&err, 1, 2), 4);
        assert_eq!(retry_delay_secs(&err, 3, 2), 16);
    }

    #[test]
    fn rate_limited_delay_honours_retry_after() {
        let err = FeedError::RateLimited {
            retry_after_secs: 30,
        };
        assert_eq!(retry_delay_secs(&err, 0, 1), 30);
        assert_eq!(retry_delay_secs(&err, 6, 1), 64);
    }
}
