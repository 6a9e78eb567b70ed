//! Single-stream GET of an archive into the local cache.
//!
//! The body goes to `{dest}.part` and is renamed onto `dest` only once the
//! transfer succeeded, so an interrupted run never leaves a truncated file
//! under the cache name.

use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use super::apply_timeouts;
use crate::retry::{FetchPolicy, TransferError};
use crate::storage::temp_path;

fn is_http(uri: &str) -> bool {
    let lower = uri.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Downloads `uri` to `dest` in one attempt. Follows redirects. Returns bytes written.
pub fn download_to(uri: &str, dest: &Path, policy: &FetchPolicy) -> Result<u64, TransferError> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(TransferError::Storage)?;
    }
    let part = temp_path(dest);
    let result = transfer_into(uri, &part, policy);
    match result {
        Ok(written) => {
            fs::rename(&part, dest).map_err(TransferError::Storage)?;
            tracing::debug!(uri, path = %dest.display(), written, "download complete");
            Ok(written)
        }
        Err(e) => {
            let _ = fs::remove_file(&part);
            Err(e)
        }
    }
}

fn transfer_into(uri: &str, part: &Path, policy: &FetchPolicy) -> Result<u64, TransferError> {
    let mut file = File::create(part).map_err(TransferError::Storage)?;
    let mut written = 0u64;
    let mut write_err: Option<std::io::Error> = None;

    let mut easy = curl::easy::Easy::new();
    easy.url(uri)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    apply_timeouts(&mut easy, policy)?;

    let performed = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match file.write_all(data) {
            Ok(()) => {
                written += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                tracing::warn!("archive write failed: {}", e);
                write_err = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };

    if let Some(e) = write_err {
        return Err(TransferError::Storage(e));
    }
    performed?;

    let code = easy.response_code()?;
    if is_http(uri) && !(200..300).contains(&code) {
        return Err(TransferError::Http(code));
    }
    file.sync_all().map_err(TransferError::Storage)?;
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_scheme_detection() {
        assert!(is_http("http://e.org/a"));
        assert!(is_http("HTTPS://e.org/a"));
        assert!(!is_http("ftp://ftp.osuosl.org/pub/apache/tomcat/"));
        assert!(!is_http("file:///tmp/a.tar.gz"));
    }

    #[test]
    fn failed_download_leaves_no_files() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("apache-tomcat-9.0.65.tar.gz");
        let r = download_to(
            "file:///nonexistent/tci/apache-tomcat-9.0.65.tar.gz",
            &dest,
            &FetchPolicy::default(),
        );
        assert!(r.is_err());
        assert!(!dest.exists());
        assert!(!temp_path(&dest).exists());
    }
}
