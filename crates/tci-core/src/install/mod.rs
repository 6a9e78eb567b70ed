//! Installs a verified tarball as a Tomcat instance.
//!
//! Steps run strictly in order and the first failure aborts the rest. Nothing
//! is rolled back: a partially extracted tree stays where it is and the next
//! run converges it (extraction is skipped once `LICENSE` exists, ownership
//! is only changed when the marker is not yet owned by the instance user).

pub mod alias;
pub mod extract;
pub mod host;

use serde::Serialize;
use std::fs::{self, DirBuilder};
use std::os::unix::fs::{DirBuilderExt, PermissionsExt};
use std::path::Path;

use crate::error::{InstallError, Step};
use crate::locations::ResolvedLocations;
use crate::request::InstallRequest;

pub use host::{HostOps, SystemHost};

/// Mode of the versioned install directory (rwxr-x---).
pub const INSTALL_DIR_MODE: u32 = 0o750;
/// Mode of the instance log directory (rwxrwx---).
pub const LOG_DIR_MODE: u32 = 0o770;

/// Package providing the extraction utility, and the binary that proves it is there.
const EXTRACTOR_PACKAGE: &str = "tar";
const EXTRACTOR_BINARY: &str = "tar";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Changed,
    Unchanged,
}

impl From<bool> for StepOutcome {
    fn from(changed: bool) -> Self {
        if changed {
            StepOutcome::Changed
        } else {
            StepOutcome::Unchanged
        }
    }
}

/// What each step did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub steps: Vec<(Step, StepOutcome)>,
}

impl InstallReport {
    fn record(&mut self, step: Step, outcome: impl Into<StepOutcome>) {
        let outcome = outcome.into();
        tracing::debug!(%step, ?outcome, "install step done");
        self.steps.push((step, outcome));
    }

    pub fn outcome(&self, step: Step) -> Option<StepOutcome> {
        self.steps
            .iter()
            .find(|(s, _)| *s == step)
            .map(|(_, outcome)| *outcome)
    }

    pub fn changed(&self) -> bool {
        self.steps
            .iter()
            .any(|(_, outcome)| *outcome == StepOutcome::Changed)
    }
}

/// Creates `path` with `mode` and enforces `mode` on it. Missing parents get
/// the default mode. Returns `true` if the directory was created or its mode
/// changed.
fn ensure_dir(path: &Path, mode: u32) -> std::io::Result<bool> {
    let existed = path.is_dir();
    if !existed {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        DirBuilder::new().mode(mode).create(path)?;
    }
    let current = fs::metadata(path)?.permissions().mode() & 0o7777;
    if current != mode {
        fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
    }
    Ok(!existed || current != mode)
}

pub struct Installer<'a> {
    host: &'a dyn HostOps,
}

impl<'a> Installer<'a> {
    pub fn new(host: &'a dyn HostOps) -> Self {
        Self { host }
    }

    /// Runs every install step for `request` using the verified `artifact`.
    pub fn install(
        &self,
        request: &InstallRequest,
        locations: &ResolvedLocations,
        artifact: &Path,
    ) -> Result<InstallReport, InstallError> {
        let mut report = InstallReport::default();
        let install_path = locations.install_path.as_path();
        let identity = request.identity();

        let changed = self
            .host
            .ensure_package(EXTRACTOR_PACKAGE, EXTRACTOR_BINARY)
            .map_err(|e| InstallError::step(Step::EnsureExtractor, EXTRACTOR_BINARY, e))?;
        report.record(Step::EnsureExtractor, changed);

        let changed = ensure_dir(install_path, INSTALL_DIR_MODE)
            .map_err(|e| InstallError::step(Step::CreateInstallDir, install_path, e))?;
        report.record(Step::CreateInstallDir, changed);

        if extract::is_extracted(install_path) {
            tracing::debug!(path = %install_path.display(), "marker present, skipping extraction");
            report.record(Step::Extract, StepOutcome::Unchanged);
        } else {
            let entries = extract::extract_strip_first(artifact, install_path)
                .map_err(|e| InstallError::step(Step::Extract, install_path, e))?;
            tracing::info!(
                archive = %artifact.display(),
                path = %install_path.display(),
                entries,
                "extracted tarball"
            );
            report.record(Step::Extract, StepOutcome::Changed);
        }

        let group_changed = self
            .host
            .ensure_group(&identity.group)
            .map_err(|e| InstallError::step(Step::CreateIdentity, install_path, e))?;
        let user_changed = self
            .host
            .ensure_user(&identity.user, &identity.group)
            .map_err(|e| InstallError::step(Step::CreateIdentity, install_path, e))?;
        report.record(Step::CreateIdentity, group_changed || user_changed);

        let marker = install_path.join(extract::MARKER_FILE);
        let owner = self
            .host
            .owner_of(&marker)
            .map_err(|e| InstallError::step(Step::SetOwnership, &marker, e))?;
        if owner.as_deref() == Some(identity.user.as_str()) {
            report.record(Step::SetOwnership, StepOutcome::Unchanged);
        } else {
            self.host
                .chown_recursive(install_path, &identity.user, &identity.group)
                .map_err(|e| InstallError::step(Step::SetOwnership, install_path, e))?;
            tracing::info!(path = %install_path.display(), user = %identity.user, "changed ownership");
            report.record(Step::SetOwnership, StepOutcome::Changed);
        }

        let changed = alias::publish(&locations.alias_path, install_path)
            .map_err(|e| InstallError::step(Step::PublishAlias, &locations.alias_path, e))?;
        if changed {
            tracing::info!(
                alias = %locations.alias_path.display(),
                target = %install_path.display(),
                "published current-version link"
            );
        }
        report.record(Step::PublishAlias, changed);

        let log_dir = locations.log_dir.as_path();
        let created = ensure_dir(log_dir, LOG_DIR_MODE)
            .map_err(|e| InstallError::step(Step::CreateLogDir, log_dir, e))?;
        let log_owner = self
            .host
            .owner_of(log_dir)
            .map_err(|e| InstallError::step(Step::CreateLogDir, log_dir, e))?;
        let log_group = self
            .host
            .group_of(log_dir)
            .map_err(|e| InstallError::step(Step::CreateLogDir, log_dir, e))?;
        let chowned = if log_owner.as_deref() == Some(identity.user.as_str())
            && log_group.as_deref() == Some(identity.group.as_str())
        {
            false
        } else {
            self.host
                .chown(log_dir, &identity.user, &identity.group)
                .map_err(|e| InstallError::step(Step::CreateLogDir, log_dir, e))?;
            true
        };
        report.record(Step::CreateLogDir, created || chowned);

        Ok(report)
    }
}
