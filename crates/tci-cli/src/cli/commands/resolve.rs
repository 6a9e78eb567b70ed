//! `tci resolve <instance> <version>` – show derived URIs and paths.

use anyhow::Result;
use std::path::PathBuf;
use tci_core::config::TciConfig;
use tci_core::locations::ResolvedLocations;

use super::install::build_request;
use crate::cli::MirrorArgs;

pub fn run_resolve(
    cfg: &TciConfig,
    instance: &str,
    version: &str,
    path: Option<PathBuf>,
    mirrors: &MirrorArgs,
    json: bool,
) -> Result<()> {
    let request = build_request(cfg, instance, version, path, mirrors)?;
    let locations = ResolvedLocations::resolve(&request, &cfg.host_layout()?);

    if json {
        println!("{}", serde_json::to_string_pretty(&locations)?);
        return Ok(());
    }

    let identity = request.identity();
    println!("major version: {}", locations.major_version);
    println!("tarball:       {}", locations.tarball_uri);
    println!("checksum:      {}", locations.checksum_uri);
    println!("install path:  {}", locations.install_path.display());
    println!("alias:         {}", locations.alias_path.display());
    println!("cache file:    {}", locations.cache_file_path.display());
    println!("log dir:       {}", locations.log_dir.display());
    println!("owner:         {}:{}", identity.user, identity.group);
    Ok(())
}
