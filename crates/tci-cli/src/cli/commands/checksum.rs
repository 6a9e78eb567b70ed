//! Checksum command: SHA-1 of a file (the digest Apache publishes), or SHA-256.

use anyhow::Result;
use std::path::Path;
use tci_core::checksum;

pub fn run_checksum(path: &Path, sha256: bool) -> Result<()> {
    let digest = if sha256 {
        checksum::sha256_path(path)?
    } else {
        checksum::sha1_path(path)?
    };
    println!("{}  {}", digest, path.display());
    Ok(())
}
