//! Install request and the per-instance system identity.

use serde::Serialize;
use std::path::PathBuf;

use crate::version::{InvalidVersion, Version};

/// Returned when an instance name cannot safely become part of a user name
/// and a directory name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("instance name must be non-empty ASCII letters, digits, '_' or '-', got {0:?}")]
pub struct InvalidInstanceName(pub String);

/// Returned when a version that matched `X.Y.Z` still cannot become part of
/// a file name (it carries a path separator or a control character).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("version must not contain '/', '\\' or control characters, got {0:?}")]
pub struct UnsafeVersion(pub String);

#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    Version(#[from] InvalidVersion),
    #[error(transparent)]
    UnsafeVersion(#[from] UnsafeVersion),
    #[error(transparent)]
    InstanceName(#[from] InvalidInstanceName),
}

/// One desired Tomcat instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstallRequest {
    pub instance_name: String,
    pub version: Version,
    /// Explicit install dir; derived from instance and version when None.
    pub install_path: Option<PathBuf>,
    pub tarball_base: String,
    pub checksum_base: String,
}

impl InstallRequest {
    /// Validates the instance name and version before anything else happens.
    pub fn new(
        instance_name: &str,
        version: &str,
        tarball_base: &str,
        checksum_base: &str,
    ) -> Result<Self, RequestError> {
        validate_instance_name(instance_name)?;
        let version = Version::parse(version)?;
        validate_version_component(version.as_str())?;
        Ok(Self {
            instance_name: instance_name.to_string(),
            version,
            install_path: None,
            tarball_base: tarball_base.to_string(),
            checksum_base: checksum_base.to_string(),
        })
    }

    pub fn with_install_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.install_path = Some(path.into());
        self
    }

    pub fn identity(&self) -> InstanceIdentity {
        InstanceIdentity::for_instance(&self.instance_name)
    }
}

pub fn validate_instance_name(name: &str) -> Result<(), InvalidInstanceName> {
    let ok = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if ok {
        Ok(())
    } else {
        Err(InvalidInstanceName(name.to_string()))
    }
}

/// The raw version ends up in the install dir and cache file names. Trailing
/// text such as `-M1` is fine; separators and control characters are not.
pub fn validate_version_component(version: &str) -> Result<(), UnsafeVersion> {
    if version.contains(['/', '\\']) || version.chars().any(char::is_control) {
        return Err(UnsafeVersion(version.to_string()));
    }
    Ok(())
}

/// POSIX user and group that own one instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceIdentity {
    pub user: String,
    pub group: String,
}

impl InstanceIdentity {
    pub fn for_instance(instance_name: &str) -> Self {
        let name = format!("tomcat_{instance_name}");
        Self {
            user: name.clone(),
            group: name,
        }
    }
}
