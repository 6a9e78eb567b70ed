use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::locations::HostLayout;
use crate::retry::FetchPolicy;

/// Default mirror for tarballs.
pub const DEFAULT_TARBALL_BASE: &str = "ftp://ftp.osuosl.org/pub/apache/tomcat/";
/// Default authority for the published `.sha1` manifests.
pub const DEFAULT_CHECKSUM_BASE: &str = "https://www.apache.org/dist/tomcat/";

/// Fetch policy parameters (optional `[fetch]` section in config.toml).
///
/// Defaults reproduce a single attempt with transport-default timeouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Maximum number of attempts per request (including the first).
    pub max_attempts: u32,
    /// Base delay in seconds for exponential backoff (e.g. 0.25 = 250ms).
    pub base_delay_secs: f64,
    /// Maximum backoff delay in seconds.
    pub max_delay_secs: u64,
    /// Connect timeout in seconds (None = libcurl default).
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
    /// Whole-transfer timeout in seconds (None = no limit).
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// Follow redirects on the checksum request. Off: anything but 200 is fatal.
    #[serde(default)]
    pub follow_checksum_redirects: bool,
    /// Abort a transfer running below this many bytes/s (None = never).
    #[serde(default)]
    pub low_speed_limit: Option<u32>,
    /// How long the transfer may stay below `low_speed_limit` (default 60).
    #[serde(default)]
    pub low_speed_time_secs: Option<u64>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay_secs: 0.25,
            max_delay_secs: 30,
            connect_timeout_secs: None,
            timeout_secs: None,
            follow_checksum_redirects: false,
            low_speed_limit: None,
            low_speed_time_secs: None,
        }
    }
}

impl FetchConfig {
    pub fn to_policy(&self) -> FetchPolicy {
        FetchPolicy::from_config(self)
    }
}

/// Global configuration loaded from `~/.config/tci/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TciConfig {
    /// Mirror base the tarball path is appended to.
    pub tarball_base: String,
    /// Base the `.sha1` manifest path is appended to.
    pub checksum_base: String,
    /// Parent of versioned install dirs and of the `tomcat_{instance}` alias.
    pub install_root: PathBuf,
    /// Parent of per-instance log directories.
    pub log_root: PathBuf,
    /// Where downloaded tarballs are cached (None = XDG cache dir).
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// Optional fetch policy; if missing, a single attempt is made.
    #[serde(default)]
    pub fetch: Option<FetchConfig>,
}

impl Default for TciConfig {
    fn default() -> Self {
        Self {
            tarball_base: DEFAULT_TARBALL_BASE.to_string(),
            checksum_base: DEFAULT_CHECKSUM_BASE.to_string(),
            install_root: PathBuf::from("/opt"),
            log_root: PathBuf::from("/var/log"),
            cache_dir: None,
            fetch: None,
        }
    }
}

impl TciConfig {
    pub fn fetch_policy(&self) -> FetchPolicy {
        self.fetch.clone().unwrap_or_default().to_policy()
    }

    /// Host layout with the cache dir resolved (XDG cache home when unset).
    pub fn host_layout(&self) -> Result<HostLayout> {
        let cache_dir = match &self.cache_dir {
            Some(dir) => dir.clone(),
            None => default_cache_dir()?,
        };
        Ok(HostLayout {
            install_root: self.install_root.clone(),
            log_root: self.log_root.clone(),
            cache_dir,
        })
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("tci")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

pub fn default_cache_dir() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("tci")?;
    Ok(xdg_dirs.get_cache_home())
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<TciConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = TciConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: TciConfig = toml::from_str(&data)?;
    Ok(cfg)
}
