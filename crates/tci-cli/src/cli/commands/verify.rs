//! `tci verify <file> <version>` – check a local tarball against the mirror.

use anyhow::{bail, Result};
use std::path::Path;
use tci_core::config::TciConfig;
use tci_core::fetch::CurlFetcher;
use tci_core::locations;
use tci_core::verify::{self, VerificationResult};
use tci_core::version::Version;

pub fn run_verify(
    cfg: &TciConfig,
    file: &Path,
    version: &str,
    checksum_base: Option<String>,
) -> Result<()> {
    let version = Version::parse(version)?;
    let base = checksum_base.unwrap_or_else(|| cfg.checksum_base.clone());
    let uri = locations::checksum_uri(&version, &base);
    let fetcher = CurlFetcher::new(cfg.fetch_policy());

    match verify::fetch_and_verify(&fetcher, &uri, file)? {
        VerificationResult::Verified => {
            println!("{}: OK", file.display());
            Ok(())
        }
        VerificationResult::ChecksumMismatch {
            expected,
            actual,
            quarantined,
        } => bail!(
            "checksum mismatch for {}: mirror says {}, file is {}; renamed to {}",
            file.display(),
            expected,
            actual,
            quarantined.display()
        ),
        VerificationResult::FetchFailed { reason } => {
            bail!("could not fetch the checksum: {reason}")
        }
    }
}
