//! Remote fetches: the published checksum manifest and the tarball itself.
//!
//! Uses the curl crate (libcurl), one blocking transfer at a time. How many
//! attempts are made and which timeouts apply comes from [`FetchPolicy`];
//! the default is a single attempt with libcurl's own timeouts.

mod download;
mod parse;

use std::path::{Path, PathBuf};

use crate::retry::{run_with_retry, FetchPolicy, TransferError};

pub use download::download_to;

/// Failure to retrieve a remote resource. Always fatal to the install.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("fetching {uri} resulted in HTTP {status}")]
    Status { uri: String, status: u32 },
    #[error("could not fetch {uri}")]
    Transport {
        uri: String,
        #[source]
        source: curl::Error,
    },
    #[error("checksum manifest at {uri} is empty")]
    EmptyManifest { uri: String },
    #[error("could not write {}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    fn from_transfer(uri: &str, path: Option<&Path>, e: TransferError) -> Self {
        match e {
            TransferError::Http(status) => FetchError::Status {
                uri: uri.to_string(),
                status,
            },
            TransferError::Curl(source) => FetchError::Transport {
                uri: uri.to_string(),
                source,
            },
            TransferError::Storage(source) => FetchError::Storage {
                path: path.map(Path::to_path_buf).unwrap_or_default(),
                source,
            },
        }
    }
}

/// Where published checksums come from.
pub trait ChecksumSource {
    /// Returns the first token of the manifest at `uri`.
    fn fetch_checksum(&self, uri: &str) -> Result<String, FetchError>;
}

/// Where archives come from.
pub trait ArtifactSource {
    /// Downloads `uri` to `dest`, returning the number of bytes written.
    fn download(&self, uri: &str, dest: &Path) -> Result<u64, FetchError>;
}

/// libcurl-backed implementation of both sources.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurlFetcher {
    policy: FetchPolicy,
}

impl CurlFetcher {
    pub fn new(policy: FetchPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &FetchPolicy {
        &self.policy
    }
}

/// Applies the policy's timeouts to a handle.
pub(crate) fn apply_timeouts(easy: &mut curl::easy::Easy, policy: &FetchPolicy) -> Result<(), curl::Error> {
    if let Some(t) = policy.connect_timeout {
        easy.connect_timeout(t)?;
    }
    if let Some(t) = policy.timeout {
        easy.timeout(t)?;
    }
    if let Some(low) = policy.low_speed {
        easy.low_speed_limit(low.limit)?;
        easy.low_speed_time(low.time)?;
    }
    Ok(())
}

/// One GET into memory. Returns the status and body; the caller judges the status.
fn get_body(uri: &str, policy: &FetchPolicy, follow: bool) -> Result<(u32, Vec<u8>), curl::Error> {
    let mut body = Vec::new();
    let mut easy = curl::easy::Easy::new();
    easy.url(uri)?;
    easy.follow_location(follow)?;
    apply_timeouts(&mut easy, policy)?;
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }
    let code = easy.response_code()?;
    Ok((code, body))
}

impl ChecksumSource for CurlFetcher {
    fn fetch_checksum(&self, uri: &str) -> Result<String, FetchError> {
        tracing::debug!(uri, "fetching checksum manifest");
        let body = run_with_retry(&self.policy.retry, || {
            let (code, body) = get_body(uri, &self.policy, self.policy.follow_checksum_redirects)?;
            if code != 200 {
                return Err(TransferError::Http(code));
            }
            Ok(body)
        })
        .map_err(|e| FetchError::from_transfer(uri, None, e))?;

        let text = String::from_utf8_lossy(&body);
        let checksum = parse::parse_manifest(&text).ok_or_else(|| FetchError::EmptyManifest {
            uri: uri.to_string(),
        })?;
        tracing::debug!(uri, checksum, "checksum manifest fetched");
        Ok(checksum.to_string())
    }
}

impl ArtifactSource for CurlFetcher {
    fn download(&self, uri: &str, dest: &Path) -> Result<u64, FetchError> {
        run_with_retry(&self.policy.retry, || download_to(uri, dest, &self.policy))
            .map_err(|e| FetchError::from_transfer(uri, Some(dest), e))
    }
}
