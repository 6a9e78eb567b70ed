//! Stable `tomcat_{instance}` symlink pointing at the current versioned install.

use anyhow::{bail, Context, Result};
use std::fs;
use std::os::unix::fs::symlink;
use std::path::{Path, PathBuf};

fn staging_path(alias: &Path) -> PathBuf {
    let mut o = alias.as_os_str().to_owned();
    o.push(".tci-new");
    PathBuf::from(o)
}

/// Points `alias` at `target`. Returns `false` when it already did.
///
/// An existing link is swapped by renaming a freshly created link over it, so
/// readers never observe a missing alias. A real file or directory at `alias`
/// is left alone and reported as an error.
pub fn publish(alias: &Path, target: &Path) -> Result<bool> {
    match fs::symlink_metadata(alias) {
        Ok(meta) if meta.file_type().is_symlink() => {
            let current = fs::read_link(alias)
                .with_context(|| format!("read link {}", alias.display()))?;
            if current == target {
                return Ok(false);
            }
        }
        Ok(_) => bail!(
            "{} exists and is not a symlink; refusing to replace it",
            alias.display()
        ),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(e).with_context(|| format!("stat {}", alias.display())),
    }

    let staging = staging_path(alias);
    let _ = fs::remove_file(&staging);
    symlink(target, &staging)
        .with_context(|| format!("link {} -> {}", staging.display(), target.display()))?;
    fs::rename(&staging, alias).with_context(|| {
        format!("rename {} to {}", staging.display(), alias.display())
    })?;
    Ok(true)
}
