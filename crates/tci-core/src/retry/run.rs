//! Retry loop: run a closure until success or policy says stop.

use super::classify;
use super::error::TransferError;
use super::policy::{RetryDecision, RetryPolicy};

/// Runs a closure until it succeeds or the retry policy says to stop.
/// On retryable failure, sleeps for the backoff duration then tries again.
pub fn run_with_retry<T, F>(policy: &RetryPolicy, mut f: F) -> Result<T, TransferError>
where
    F: FnMut() -> Result<T, TransferError>,
{
    let mut attempt = 1u32;
    loop {
        match f() {
            Ok(v) => return Ok(v),
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => return Err(e),
                    RetryDecision::RetryAfter(d) => {
                        tracing::debug!(attempt, ?kind, "retrying after {:?}: {}", d, e);
                        std::thread::sleep(d);
                        attempt += 1;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        }
    }

    #[test]
    fn single_attempt_by_default() {
        let mut calls = 0;
        let r: Result<(), _> = run_with_retry(&RetryPolicy::default(), || {
            calls += 1;
            Err(TransferError::Http(503))
        });
        assert!(matches!(r, Err(TransferError::Http(503))));
        assert_eq!(calls, 1);
    }

    #[test]
    fn retries_retryable_until_success() {
        let mut calls = 0;
        let r = run_with_retry(&fast_policy(3), || {
            calls += 1;
            if calls < 3 {
                Err(TransferError::Http(502))
            } else {
                Ok(calls)
            }
        });
        assert_eq!(r.unwrap(), 3);
    }

    #[test]
    fn does_not_retry_not_found() {
        let mut calls = 0;
        let r: Result<(), _> = run_with_retry(&fast_policy(5), || {
            calls += 1;
            Err(TransferError::Http(404))
        });
        assert!(r.is_err());
        assert_eq!(calls, 1);
    }
}
