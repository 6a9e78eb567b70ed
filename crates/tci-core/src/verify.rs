//! Artifact verification against a published SHA-1.
//!
//! The comparison is exact: the manifest token and the lowercase hex digest
//! must be byte-for-byte equal. A mismatching file is renamed to `{path}.bad`
//! so a retry cannot pick up the corrupted cached copy.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::checksum;
use crate::fetch::ChecksumSource;
use crate::storage;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum VerificationResult {
    Verified,
    ChecksumMismatch {
        expected: String,
        actual: String,
        /// Where the rejected file now lives.
        quarantined: PathBuf,
    },
    FetchFailed {
        reason: String,
    },
}

impl VerificationResult {
    pub fn is_verified(&self) -> bool {
        matches!(self, VerificationResult::Verified)
    }
}

/// Compares the SHA-1 of `path` with `expected`, quarantining on mismatch.
pub fn verify(path: &Path, expected: &str) -> Result<VerificationResult> {
    let actual = checksum::sha1_path(path)?;
    if actual == expected {
        tracing::debug!(path = %path.display(), checksum = %actual, "checksum verified");
        return Ok(VerificationResult::Verified);
    }

    let quarantined = storage::quarantine(path)
        .with_context(|| format!("could not quarantine {}", path.display()))?;
    tracing::warn!(
        path = %path.display(),
        expected,
        actual = %actual,
        "checksum mismatch, renamed to {}",
        quarantined.display()
    );
    Ok(VerificationResult::ChecksumMismatch {
        expected: expected.to_string(),
        actual,
        quarantined,
    })
}

/// Fetches the published checksum from `source` and verifies `path` against it.
/// A failed fetch leaves the file untouched.
pub fn fetch_and_verify(
    source: &dyn ChecksumSource,
    checksum_uri: &str,
    path: &Path,
) -> Result<VerificationResult> {
    match source.fetch_checksum(checksum_uri) {
        Ok(expected) => verify(path, &expected),
        Err(e) => Ok(VerificationResult::FetchFailed {
            reason: format!("{:#}", anyhow::Error::new(e)),
        }),
    }
}
