//! Error taxonomy for one install attempt.
//!
//! Every variant is terminal: nothing is retried locally and completed steps
//! are not rolled back. Messages name the stage and the concrete values
//! involved so the failure can be diagnosed from the CLI output alone.

use std::fmt;
use std::path::PathBuf;

use crate::fetch::FetchError;
use crate::request::RequestError;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Installer steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    EnsureExtractor,
    CreateInstallDir,
    Extract,
    CreateIdentity,
    SetOwnership,
    PublishAlias,
    CreateLogDir,
}

impl Step {
    pub const ALL: [Step; 7] = [
        Step::EnsureExtractor,
        Step::CreateInstallDir,
        Step::Extract,
        Step::CreateIdentity,
        Step::SetOwnership,
        Step::PublishAlias,
        Step::CreateLogDir,
    ];
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Step::EnsureExtractor => "ensure extraction tool",
            Step::CreateInstallDir => "create install directory",
            Step::Extract => "extract tarball",
            Step::CreateIdentity => "create instance user and group",
            Step::SetOwnership => "set install directory ownership",
            Step::PublishAlias => "publish current-version link",
            Step::CreateLogDir => "create log directory",
        };
        f.write_str(s)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InstallError {
    #[error("invalid install request")]
    Request(#[from] RequestError),

    #[error("fetching the Tomcat tarball checksum failed")]
    Checksum(#[source] FetchError),

    #[error("downloading the Tomcat tarball failed")]
    Download(#[source] FetchError),

    #[error(
        "the checksum of the tarball on disk ({actual}) does not match the checksum from the mirror ({expected}); renamed {} to {}",
        path.display(),
        quarantined.display()
    )]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
        quarantined: PathBuf,
    },

    #[error("could not verify {}", path.display())]
    Verify {
        path: PathBuf,
        #[source]
        source: BoxError,
    },

    #[error("install step '{step}' failed for {}", path.display())]
    Step {
        step: Step,
        path: PathBuf,
        #[source]
        source: BoxError,
    },
}

impl InstallError {
    pub fn step(step: Step, path: impl Into<PathBuf>, source: impl Into<BoxError>) -> Self {
        InstallError::Step {
            step,
            path: path.into(),
            source: source.into(),
        }
    }

    /// Short label of the stage that failed, for log fields.
    pub fn stage(&self) -> &'static str {
        match self {
            InstallError::Request(_) => "validate",
            InstallError::Checksum(_) => "fetch_checksum",
            InstallError::Download(_) => "download",
            InstallError::ChecksumMismatch { .. } | InstallError::Verify { .. } => "verify",
            InstallError::Step { .. } => "install",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::version::InvalidVersion;

    #[test]
    fn step_error_names_step_and_path() {
        let e = InstallError::step(
            Step::Extract,
            "/opt/tomcat_app_9_0_65/",
            std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        );
        assert_eq!(
            e.to_string(),
            "install step 'extract tarball' failed for /opt/tomcat_app_9_0_65/"
        );
        assert!(std::error::Error::source(&e).is_some());
        assert_eq!(e.stage(), "install");
    }

    #[test]
    fn mismatch_message_has_both_digests() {
        let e = InstallError::ChecksumMismatch {
            path: PathBuf::from("/c/a.tar.gz"),
            expected: "abc124".into(),
            actual: "abc123".into(),
            quarantined: PathBuf::from("/c/a.tar.gz.bad"),
        };
        let msg = e.to_string();
        assert!(msg.contains("(abc123)"));
        assert!(msg.contains("(abc124)"));
        assert!(msg.contains("/c/a.tar.gz.bad"));
    }

    #[test]
    fn request_error_chain() {
        let e = InstallError::from(RequestError::from(InvalidVersion("9".into())));
        let chain = format!("{:#}", anyhow::Error::new(e));
        assert_eq!(
            chain,
            "invalid install request: the version must be in X.Y.Z format, got \"9\""
        );
    }

    #[test]
    fn steps_are_ordered() {
        assert_eq!(Step::ALL.first(), Some(&Step::EnsureExtractor));
        assert_eq!(Step::ALL.last(), Some(&Step::CreateLogDir));
    }
}
