//! Retry, backoff and timeout policy for remote fetches.
//!
//! Error classification (timeouts, throttling, connection failures) and
//! exponential backoff decisions live here so the checksum fetcher and the
//! tarball downloader share one policy. The default policy makes exactly one
//! attempt.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use error::TransferError;
pub use policy::{ErrorKind, FetchPolicy, LowSpeed, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
