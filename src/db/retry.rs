//! Transient-storage retry (SPEC_FULL.md §7: `TransientStorageError` is
//! "retried by the worker with exponential backoff, jitter, bounded to 3
//! attempts"), grounded in the teacher's rate-limited-retry loop in
//! `services/price_service.rs::refresh_ticker_prices` — same shape
//! (bounded retry count, growing delay, a classifier deciding what's worth
//! retrying), applied here to connection-level database errors instead of
//! an upstream API's rate limiting.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use rand::{rng, Rng};

/// A retried operation's future, boxed so `with_retry` can be generic over
/// callers that reborrow some context (typically a `&mut PgConnection`) on
/// each attempt without tying the closure's output type to one concrete
/// `impl Future`.
pub type RetryFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, sqlx::Error>> + Send + 'a>>;

pub const MAX_ATTEMPTS: u32 = 3;
const BASE_DELAY_MS: u64 = 100;

/// A database error is transient when it reflects a connection/pool
/// hiccup rather than a malformed row — the latter belongs in the upsert
/// writer's per-row fallback (SPEC_FULL.md §4.9), never a blind retry.
pub fn is_transient(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => true,
        sqlx::Error::Database(db_err) => {
            matches!(db_err.code().as_deref(), Some("40001") | Some("40P01") | Some("57P03") | Some("08006") | Some("08003"))
        }
        _ => false,
    }
}

/// Exponential backoff with full jitter: `base * 2^attempt` scaled by a
/// random factor in `[0.5, 1.0)`, so concurrent retrying tasks don't all
/// wake up on the same tick.
pub fn backoff_delay(attempt: u32) -> Duration {
    let exponential = BASE_DELAY_MS.saturating_mul(1u64 << attempt);
    let jitter_factor = rng().random_range(0.5..1.0);
    Duration::from_millis((exponential as f64 * jitter_factor) as u64)
}

/// Runs `op` up to `MAX_ATTEMPTS` times, retrying only when the error
/// classifies as transient. Non-transient errors and the final attempt's
/// error are returned immediately.
///
/// `op` takes its context (normally a `&mut PgConnection`) as an explicit,
/// freshly reborrowed argument on every attempt
/// (`for<'a> FnMut(&'a mut C) -> RetryFuture<'a, T>`) rather than capturing
/// it, since a plain `FnMut() -> Fut` cannot hand out a future that borrows
/// from the closure's own captured state — the closure's environment
/// doesn't outlive the `&mut self` of the `FnMut` call it came from.
pub async fn with_retry<C: ?Sized, T, F>(ctx: &mut C, mut op: F) -> Result<T, sqlx::Error>
where
    F: for<'a> FnMut(&'a mut C) -> RetryFuture<'a, T>,
{
    let mut attempt = 0;
    loop {
        match op(&mut *ctx).await {
            Ok(value) => return Ok(value),
            Err(err) if attempt + 1 < MAX_ATTEMPTS && is_transient(&err) => {
                attempt += 1;
                tracing::warn!(attempt, error = %err, "transient storage error, retrying after backoff");
                tokio::time::sleep(backoff_delay(attempt)).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn retries_transient_errors_up_to_the_cap() {
        let calls = AtomicU32::new(0);
        let mut ctx = ();
        let result: Result<(), sqlx::Error> = with_retry(&mut ctx, |_| {
            Box::pin(async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 {
                    Err(sqlx::Error::PoolTimedOut)
                } else {
                    Ok(())
                }
            })
        })
        .await;
        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let mut ctx = ();
        let result: Result<(), sqlx::Error> = with_retry(&mut ctx, |_| {
            Box::pin(async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(sqlx::Error::PoolTimedOut)
            })
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn non_transient_errors_are_not_retried() {
        assert!(!is_transient(&sqlx::Error::RowNotFound));
    }

    #[test]
    fn connection_errors_are_transient() {
        assert!(is_transient(&sqlx::Error::PoolTimedOut));
    }
}
