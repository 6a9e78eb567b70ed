//! URI and path resolution for one install request.
//!
//! Pure string composition: nothing here touches the network or the disk.
//! A malformed base simply yields an unreachable URI that fails at fetch time.

use serde::Serialize;
use std::path::PathBuf;

use crate::request::InstallRequest;
use crate::url_model::filename_from_url_path;
use crate::version::Version;

/// Host directories the derived paths hang off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostLayout {
    pub install_root: PathBuf,
    pub log_root: PathBuf,
    pub cache_dir: PathBuf,
}

/// Download and manifest URIs for one version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactUris {
    pub tarball: String,
    pub checksum: String,
}

/// Everything derived from an [`InstallRequest`]. Computed once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLocations {
    pub major_version: String,
    pub tarball_uri: String,
    pub checksum_uri: String,
    pub install_path: PathBuf,
    pub cache_file_path: PathBuf,
    /// Stable "current version" symlink.
    pub alias_path: PathBuf,
    pub log_dir: PathBuf,
}

/// Path of the tarball below a mirror base.
pub fn artifact_suffix(major: &str, version: &str) -> String {
    format!("tomcat-{major}/v{version}/bin/apache-tomcat-{version}.tar.gz")
}

/// Appends `suffix` to `base`, inserting a `/` unless `base` already ends in one.
pub fn join_base(base: &str, suffix: &str) -> String {
    let mut uri = String::with_capacity(base.len() + suffix.len() + 1);
    uri.push_str(base);
    if !uri.ends_with('/') {
        uri.push('/');
    }
    uri.push_str(suffix);
    uri
}

pub fn resolve(version: &str, major: &str, tarball_base: &str, checksum_base: &str) -> ArtifactUris {
    let suffix = artifact_suffix(major, version);
    ArtifactUris {
        tarball: join_base(tarball_base, &suffix),
        checksum: join_base(checksum_base, &format!("{suffix}.sha1")),
    }
}

/// Manifest URI alone, for callers that have no tarball mirror in play.
pub fn checksum_uri(version: &Version, checksum_base: &str) -> String {
    let suffix = artifact_suffix(version.major_segment(), version.as_str());
    join_base(checksum_base, &format!("{suffix}.sha1"))
}

/// `{install_root}/tomcat_{instance}_{version_underscored}/`
pub fn default_install_path(install_root: &std::path::Path, instance: &str, version: &Version) -> PathBuf {
    install_root.join(format!("tomcat_{}_{}/", instance, version.underscored()))
}

impl ResolvedLocations {
    pub fn resolve(request: &InstallRequest, layout: &HostLayout) -> Self {
        let version = &request.version;
        let major = version.major_segment();
        let uris = resolve(
            version.as_str(),
            major,
            &request.tarball_base,
            &request.checksum_base,
        );

        let install_path = request.install_path.clone().unwrap_or_else(|| {
            default_install_path(&layout.install_root, &request.instance_name, version)
        });
        let cache_name = filename_from_url_path(&uris.tarball)
            .unwrap_or_else(|| format!("apache-tomcat-{}.tar.gz", version));
        let instance_dir = format!("tomcat_{}", request.instance_name);

        Self {
            major_version: major.to_string(),
            tarball_uri: uris.tarball,
            checksum_uri: uris.checksum,
            install_path,
            cache_file_path: layout.cache_dir.join(cache_name),
            alias_path: layout.install_root.join(&instance_dir),
            log_dir: layout.log_root.join(&instance_dir),
        }
    }
}
