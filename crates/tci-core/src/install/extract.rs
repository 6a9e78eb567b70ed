//! Gzip tarball extraction with the single top-level directory stripped
//! (the equivalent of `tar -xzf ... --strip-components=1`).

use anyhow::{bail, Context, Result};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::path::{Component, Path, PathBuf};
use tar::EntryType;

/// File whose presence means the archive was already extracted.
pub const MARKER_FILE: &str = "LICENSE";

pub fn is_extracted(install_path: &Path) -> bool {
    install_path.join(MARKER_FILE).exists()
}

/// Maps an archive path to its destination below `dest`, dropping the first
/// component. Returns `None` for the top-level directory itself.
fn strip_first(dest: &Path, relpath: &Path) -> Result<Option<PathBuf>> {
    for part in relpath.components() {
        match part {
            Component::Normal(_) | Component::CurDir => {}
            _ => bail!("tar path '{}' is not supported", relpath.display()),
        }
    }
    let mut components = relpath
        .components()
        .filter(|c| !matches!(c, Component::CurDir));
    components.next();
    let rest: PathBuf = components.collect();
    if rest.as_os_str().is_empty() {
        return Ok(None);
    }
    Ok(Some(dest.join(rest)))
}

/// Fails if any directory between `dest` and `path` is a symlink, so a link
/// entry cannot redirect later entries outside `dest`.
fn ensure_no_symlink_parent(dest: &Path, path: &Path) -> Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    for dir in parent.ancestors().take_while(|d| d.starts_with(dest) && *d != dest) {
        if fs::symlink_metadata(dir).map(|m| m.file_type().is_symlink()).unwrap_or(false) {
            bail!("tar entry '{}' would be written through symlink {}", path.display(), dir.display());
        }
    }
    Ok(())
}

/// Extracts `archive` into `dest`. Returns the number of entries written.
pub fn extract_strip_first(archive: &Path, dest: &Path) -> Result<usize> {
    let file = File::open(archive).with_context(|| format!("open {}", archive.display()))?;
    let mut tarball = tar::Archive::new(GzDecoder::new(file));
    let mut written = 0usize;

    for entry in tarball
        .entries()
        .with_context(|| format!("read {}", archive.display()))?
    {
        let mut entry = entry.with_context(|| format!("read entry in {}", archive.display()))?;
        let relpath = entry.path()?.into_owned();
        let Some(full_path) = strip_first(dest, &relpath)? else {
            continue;
        };

        match entry.header().entry_type() {
            EntryType::Directory | EntryType::Regular | EntryType::Symlink => {}
            // pax/GNU metadata records are consumed by the tar crate itself
            EntryType::XGlobalHeader | EntryType::XHeader => continue,
            other => bail!(
                "tar entry '{}' has unsupported type {:?}",
                relpath.display(),
                other
            ),
        }

        ensure_no_symlink_parent(dest, &full_path)?;
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
        entry
            .unpack(&full_path)
            .with_context(|| format!("unpack {}", full_path.display()))?;
        written += 1;
    }

    Ok(written)
}
