//! End-to-end install of one request.
//!
//! Order: resolve locations, fetch the published checksum, download the
//! tarball (unless cached), verify it, install it. Each stage gates the next
//! and the first failure ends the attempt.

use serde::Serialize;

use crate::error::InstallError;
use crate::fetch::{ArtifactSource, ChecksumSource};
use crate::install::{HostOps, InstallReport, Installer};
use crate::locations::{HostLayout, ResolvedLocations};
use crate::request::InstallRequest;
use crate::verify::{self, VerificationResult};

#[derive(Debug, Clone, Serialize)]
pub struct InstallSummary {
    pub locations: ResolvedLocations,
    pub checksum: String,
    /// False when a cached tarball was reused.
    pub downloaded: bool,
    pub report: InstallReport,
}

pub struct Pipeline<'a> {
    checksums: &'a dyn ChecksumSource,
    artifacts: &'a dyn ArtifactSource,
    host: &'a dyn HostOps,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        checksums: &'a dyn ChecksumSource,
        artifacts: &'a dyn ArtifactSource,
        host: &'a dyn HostOps,
    ) -> Self {
        Self {
            checksums,
            artifacts,
            host,
        }
    }

    pub fn run(
        &self,
        request: &InstallRequest,
        layout: &HostLayout,
    ) -> Result<InstallSummary, InstallError> {
        let span = tracing::info_span!(
            "install",
            instance = %request.instance_name,
            version = %request.version
        );
        let _enter = span.enter();

        let result = self.run_stages(request, layout);
        if let Err(e) = &result {
            tracing::error!(stage = e.stage(), error = %e, "install aborted");
        }
        result
    }

    fn run_stages(
        &self,
        request: &InstallRequest,
        layout: &HostLayout,
    ) -> Result<InstallSummary, InstallError> {
        let locations = ResolvedLocations::resolve(request, layout);
        tracing::debug!(?locations, "resolved locations");

        let checksum = self
            .checksums
            .fetch_checksum(&locations.checksum_uri)
            .map_err(InstallError::Checksum)?;
        tracing::info!(uri = %locations.checksum_uri, %checksum, "fetched published checksum");

        let cache = locations.cache_file_path.as_path();
        let downloaded = if cache.is_file() {
            tracing::info!(path = %cache.display(), "reusing cached tarball");
            false
        } else {
            let bytes = self
                .artifacts
                .download(&locations.tarball_uri, cache)
                .map_err(InstallError::Download)?;
            tracing::info!(uri = %locations.tarball_uri, path = %cache.display(), bytes, "downloaded tarball");
            true
        };

        let verification = verify::verify(cache, &checksum).map_err(|e| InstallError::Verify {
            path: cache.to_path_buf(),
            source: e.into(),
        })?;
        match verification {
            VerificationResult::Verified => {}
            VerificationResult::ChecksumMismatch {
                expected,
                actual,
                quarantined,
            } => {
                return Err(InstallError::ChecksumMismatch {
                    path: cache.to_path_buf(),
                    expected,
                    actual,
                    quarantined,
                })
            }
            // verify() does not fetch
            VerificationResult::FetchFailed { reason } => {
                return Err(InstallError::Verify {
                    path: cache.to_path_buf(),
                    source: reason.into(),
                })
            }
        }

        let report = Installer::new(self.host).install(request, &locations, cache)?;
        tracing::info!(
            path = %locations.install_path.display(),
            changed = report.changed(),
            "install complete"
        );

        Ok(InstallSummary {
            locations,
            checksum,
            downloaded,
            report,
        })
    }
}
