use std::time::Duration;

use crate::config::FetchConfig;

/// High-level classification of an error for retry purposes.
///
/// Callers map HTTP status codes, curl errors, or IO failures into these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Server asked us to slow down (e.g. 429, 503).
    Throttled,
    /// Network-level failure (connection reset, DNS, etc.).
    Connection,
    /// HTTP status that is retryable but not strictly throttling (5xx).
    Http5xx(u16),
    /// Any other error (never retried).
    Other,
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Exponential backoff policy with caps.
///
/// The default allows a single attempt: a transient failure is fatal and the
/// whole install has to be re-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Base delay for backoff.
    pub base_delay: Duration,
    /// Upper bound on backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Compute the next backoff delay for a given attempt and error kind.
    ///
    /// `attempt` is 1-based (1 = first attempt). Returns `RetryDecision::NoRetry`
    /// when we should stop retrying.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }

        match kind {
            ErrorKind::Other => RetryDecision::NoRetry,
            ErrorKind::Timeout
            | ErrorKind::Connection
            | ErrorKind::Throttled
            | ErrorKind::Http5xx(_) => {
                // base * 2^(attempt-1), capped.
                let exp = 1u32 << attempt.saturating_sub(1).min(8);
                let raw = self.base_delay.saturating_mul(exp);
                RetryDecision::RetryAfter(raw.min(self.max_delay))
            }
        }
    }
}

/// Abort a transfer that stays below `limit` bytes/s for `time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LowSpeed {
    pub limit: u32,
    pub time: Duration,
}

/// Default window for `low_speed_time_secs`.
const DEFAULT_LOW_SPEED_TIME: Duration = Duration::from_secs(60);

/// Everything a fetcher needs to know about how hard to try.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FetchPolicy {
    pub retry: RetryPolicy,
    /// Connect timeout; None leaves libcurl's default in place.
    pub connect_timeout: Option<Duration>,
    /// Whole-transfer timeout; None means no limit.
    pub timeout: Option<Duration>,
    pub follow_checksum_redirects: bool,
    /// Low-speed abort; None leaves libcurl's default (never) in place.
    pub low_speed: Option<LowSpeed>,
}

impl FetchPolicy {
    pub fn from_config(cfg: &FetchConfig) -> Self {
        let defaults = RetryPolicy::default();
        Self {
            retry: RetryPolicy {
                max_attempts: cfg.max_attempts.max(1),
                base_delay: Duration::try_from_secs_f64(cfg.base_delay_secs)
                    .unwrap_or(defaults.base_delay),
                max_delay: Duration::from_secs(cfg.max_delay_secs),
            },
            connect_timeout: cfg.connect_timeout_secs.map(Duration::from_secs),
            timeout: cfg.timeout_secs.map(Duration::from_secs),
            follow_checksum_redirects: cfg.follow_checksum_redirects,
            low_speed: cfg.low_speed_limit.map(|limit| LowSpeed {
                limit,
                time: cfg
                    .low_speed_time_secs
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_LOW_SPEED_TIME),
            }),
        }
    }
}
