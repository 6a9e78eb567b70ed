//! Operations the installer delegates to the host OS.
//!
//! The installer only talks to [`HostOps`]; [`SystemHost`] is the real
//! implementation (package manager, `groupadd`/`useradd`, `lchown`).

use anyhow::{bail, Context, Result};
use nix::unistd::{Gid, Group, Uid, User};
use std::env;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use walkdir::WalkDir;

/// Host collaborators used by the installer. Each `ensure_*` returns `true`
/// when it had to change something.
pub trait HostOps {
    /// Makes sure `binary` is available, installing `package` if it is not.
    fn ensure_package(&self, package: &str, binary: &str) -> Result<bool>;
    fn ensure_group(&self, group: &str) -> Result<bool>;
    /// Creates `user` with `group` as its primary group.
    fn ensure_user(&self, user: &str, group: &str) -> Result<bool>;
    /// Name of the user owning `path`; None if missing or the uid has no name.
    fn owner_of(&self, path: &Path) -> Result<Option<String>>;
    /// Name of the group owning `path`; None if missing or the gid has no name.
    fn group_of(&self, path: &Path) -> Result<Option<String>>;
    /// Changes owner of `path` and everything below it, not following symlinks.
    fn chown_recursive(&self, path: &Path, user: &str, group: &str) -> Result<()>;
    fn chown(&self, path: &Path, user: &str, group: &str) -> Result<()>;
}

/// Package managers tried in order, with their non-interactive install args.
const PACKAGE_MANAGERS: &[(&str, &[&str])] = &[
    ("apt-get", &["install", "-y"]),
    ("dnf", &["install", "-y"]),
    ("yum", &["install", "-y"]),
    ("zypper", &["--non-interactive", "install"]),
];

/// The running Linux host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

pub(crate) fn find_on_path(binary: &str) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(binary))
        .find(|candidate| candidate.is_file())
}

fn run(program: &str, args: &[&str]) -> Result<()> {
    tracing::debug!(program, ?args, "running");
    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("could not run {program}"))?;
    if !output.status.success() {
        bail!(
            "{} {} exited with {}: {}",
            program,
            args.join(" "),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }
    Ok(())
}

fn lookup_ids(user: &str, group: &str) -> Result<(u32, u32)> {
    let uid = User::from_name(user)?
        .with_context(|| format!("no such user {user}"))?
        .uid;
    let gid = Group::from_name(group)?
        .with_context(|| format!("no such group {group}"))?
        .gid;
    Ok((uid.as_raw(), gid.as_raw()))
}

fn stat(path: &Path) -> Result<Option<std::fs::Metadata>> {
    match std::fs::metadata(path) {
        Ok(m) => Ok(Some(m)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e).with_context(|| format!("stat {}", path.display())),
    }
}

impl HostOps for SystemHost {
    fn ensure_package(&self, package: &str, binary: &str) -> Result<bool> {
        if let Some(found) = find_on_path(binary) {
            tracing::debug!(binary, path = %found.display(), "already installed");
            return Ok(false);
        }
        let (manager, args) = PACKAGE_MANAGERS
            .iter()
            .find(|(manager, _)| find_on_path(manager).is_some())
            .with_context(|| format!("{binary} is missing and no supported package manager was found"))?;
        let mut full: Vec<&str> = args.to_vec();
        full.push(package);
        run(manager, &full)?;
        tracing::info!(package, manager, "installed package");
        Ok(true)
    }

    fn ensure_group(&self, group: &str) -> Result<bool> {
        if Group::from_name(group)?.is_some() {
            return Ok(false);
        }
        run("groupadd", &["--system", group])?;
        tracing::info!(group, "created group");
        Ok(true)
    }

    fn ensure_user(&self, user: &str, group: &str) -> Result<bool> {
        if User::from_name(user)?.is_some() {
            return Ok(false);
        }
        run("useradd", &["--system", "--gid", group, "--no-create-home", user])?;
        tracing::info!(user, group, "created user");
        Ok(true)
    }

    fn owner_of(&self, path: &Path) -> Result<Option<String>> {
        let Some(meta) = stat(path)? else {
            return Ok(None);
        };
        Ok(User::from_uid(Uid::from_raw(meta.uid()))?.map(|u| u.name))
    }

    fn group_of(&self, path: &Path) -> Result<Option<String>> {
        let Some(meta) = stat(path)? else {
            return Ok(None);
        };
        Ok(Group::from_gid(Gid::from_raw(meta.gid()))?.map(|g| g.name))
    }

    fn chown_recursive(&self, path: &Path, user: &str, group: &str) -> Result<()> {
        let (uid, gid) = lookup_ids(user, group)?;
        for entry in WalkDir::new(path) {
            let entry = entry.with_context(|| format!("walk {}", path.display()))?;
            std::os::unix::fs::lchown(entry.path(), Some(uid), Some(gid))
                .with_context(|| format!("chown {}", entry.path().display()))?;
        }
        Ok(())
    }

    fn chown(&self, path: &Path, user: &str, group: &str) -> Result<()> {
        let (uid, gid) = lookup_ids(user, group)?;
        std::os::unix::fs::chown(path, Some(uid), Some(gid))
            .with_context(|| format!("chown {}", path.display()))
    }
}
