//! Bounded retry of transient infrastructure errors.
//!
//! The only local error recovery the application layer is allowed: a
//! transient transport failure may be retried a small bounded number of
//! times. Conflicts, validation failures and not-found results are
//! deterministic and are returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::config::{TRANSIENT_RETRY_ATTEMPTS, TRANSIENT_RETRY_DELAY_MS};
use crate::errors::AppResult;

/// Run `op`, retrying while it fails with a transient error.
///
/// `op` is a factory so each attempt gets a fresh future; a retried
/// operation must be safe to re-run from scratch (the Unit of Work has
/// already rolled back any partial attempt).
pub async fn transient<T, F, Fut>(op: F) -> AppResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_transient() && attempt < TRANSIENT_RETRY_ATTEMPTS => {
                tracing::warn!(attempt, "Transient infrastructure error, retrying");
                tokio::time::sleep(Duration::from_millis(TRANSIENT_RETRY_DELAY_MS)).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = transient(|| async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(AppError::infrastructure("flaky"))
            } else {
                Ok(42)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_bounded_attempts() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = transient(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::infrastructure("still down"))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), TRANSIENT_RETRY_ATTEMPTS);
    }

    #[tokio::test]
    async fn deterministic_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = transient(|| async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(AppError::conflict("duplicate"))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
