//! File digests, computed in bounded chunks so large archives stay cheap on memory.

use anyhow::{Context, Result};
use sha1::Sha1;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const BUF_SIZE: usize = 64 * 1024;

fn digest_path<D: Digest>(path: &Path) -> Result<String> {
    let mut f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut hasher = D::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = f
            .read(&mut buf)
            .with_context(|| format!("read {}", path.display()))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// SHA-1 of a file as lowercase hex. This is the only digest the Tomcat
/// distribution publishes next to its tarballs.
pub fn sha1_path(path: &Path) -> Result<String> {
    digest_path::<Sha1>(path)
}

/// SHA-256 of a file as lowercase hex.
pub fn sha256_path(path: &Path) -> Result<String> {
    digest_path::<Sha256>(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn sha1_path_empty_file() {
        let f = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(
            sha1_path(f.path()).unwrap(),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
    }

    #[test]
    fn sha1_path_known_content() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello\n").unwrap();
        f.flush().unwrap();
        assert_eq!(
            sha1_path(f.path()).unwrap(),
            "f572d396fae9206628714fb2ce00f72e94f2258f"
        );
    }

    #[test]
    fn sha256_path_known_content() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"hello\n").unwrap();
        f.flush().unwrap();
        assert_eq!(
            sha256_path(f.path()).unwrap(),
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
    }

    #[test]
    fn spans_multiple_buffers() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        let data: Vec<u8> = (0u8..=255).cycle().take(BUF_SIZE * 3 + 17).collect();
        f.write_all(&data).unwrap();
        f.flush().unwrap();
        let expected = hex::encode(Sha1::digest(&data));
        assert_eq!(sha1_path(f.path()).unwrap(), expected);
    }

    #[test]
    fn missing_file_names_path() {
        let err = sha1_path(Path::new("/nonexistent/tci.tar.gz")).unwrap_err();
        assert!(format!("{:#}", err).contains("/nonexistent/tci.tar.gz"));
    }
}
