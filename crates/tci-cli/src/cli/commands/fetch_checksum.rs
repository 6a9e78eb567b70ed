//! `tci fetch-checksum <version>` – print the published SHA-1.

use anyhow::Result;
use tci_core::config::TciConfig;
use tci_core::fetch::{ChecksumSource, CurlFetcher};
use tci_core::locations;
use tci_core::version::Version;

pub fn run_fetch_checksum(cfg: &TciConfig, version: &str, checksum_base: Option<String>) -> Result<()> {
    let version = Version::parse(version)?;
    let base = checksum_base.unwrap_or_else(|| cfg.checksum_base.clone());
    let uri = locations::checksum_uri(&version, &base);

    let checksum = CurlFetcher::new(cfg.fetch_policy()).fetch_checksum(&uri)?;
    println!("{}  {}", checksum, uri);
    Ok(())
}
