//! Cache file lifecycle: `.part` while downloading, `.bad` once rejected.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";
/// Suffix given to an archive whose checksum did not match.
pub const QUARANTINE_SUFFIX: &str = ".bad";

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut o: OsString = path.as_os_str().to_owned();
    o.push(suffix);
    PathBuf::from(o)
}

/// Path for the temp file: `file.tar.gz` → `file.tar.gz.part`.
pub fn temp_path(final_path: &Path) -> PathBuf {
    with_suffix(final_path, TEMP_SUFFIX)
}

/// Path a rejected file is moved to: `file.tar.gz` → `file.tar.gz.bad`.
pub fn quarantine_path(path: &Path) -> PathBuf {
    with_suffix(path, QUARANTINE_SUFFIX)
}

/// Moves `path` aside so the next run downloads a fresh copy.
/// An older `.bad` file at the destination is replaced.
pub fn quarantine(path: &Path) -> io::Result<PathBuf> {
    let bad = quarantine_path(path);
    std::fs::rename(path, &bad)?;
    Ok(bad)
}
