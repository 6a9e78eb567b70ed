//! `tci install <instance> <version>` – fetch, verify and install one release.

use anyhow::Result;
use std::path::PathBuf;
use tci_core::config::TciConfig;
use tci_core::fetch::CurlFetcher;
use tci_core::install::{StepOutcome, SystemHost};
use tci_core::{InstallRequest, Pipeline};

use crate::cli::MirrorArgs;

/// Validated request with mirror bases filled in from config.
pub(super) fn build_request(
    cfg: &TciConfig,
    instance: &str,
    version: &str,
    path: Option<PathBuf>,
    mirrors: &MirrorArgs,
) -> Result<InstallRequest> {
    let (tarball_base, checksum_base) = mirrors.bases(cfg);
    let mut request = InstallRequest::new(instance, version, &tarball_base, &checksum_base)?;
    if let Some(path) = path {
        request = request.with_install_path(path);
    }
    Ok(request)
}

pub fn run_install(
    cfg: &TciConfig,
    instance: &str,
    version: &str,
    path: Option<PathBuf>,
    mirrors: &MirrorArgs,
) -> Result<()> {
    let request = build_request(cfg, instance, version, path, mirrors)?;
    let layout = cfg.host_layout()?;
    let fetcher = CurlFetcher::new(cfg.fetch_policy());
    let host = SystemHost;

    let summary = Pipeline::new(&fetcher, &fetcher, &host).run(&request, &layout)?;

    println!(
        "Installed Tomcat {} for {} at {}",
        request.version,
        request.instance_name,
        summary.locations.install_path.display()
    );
    if !summary.downloaded {
        println!(
            "Reused cached tarball {}",
            summary.locations.cache_file_path.display()
        );
    }
    for (step, outcome) in &summary.report.steps {
        let outcome = match outcome {
            StepOutcome::Changed => "changed",
            StepOutcome::Unchanged => "ok",
        };
        println!("  {:<32} {}", step.to_string(), outcome);
    }
    Ok(())
}
