use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::digest::HashAlgorithm;

/// Manifest fetch parameters (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Seconds allowed to establish the connection.
    pub connect_timeout_secs: u64,
    /// Seconds allowed for the whole request, body included.
    pub timeout_secs: u64,
    /// Largest manifest body accepted; larger responses are treated as a network failure.
    pub max_body_bytes: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 15,
            timeout_secs: 60,
            max_body_bytes: 16 * 1024 * 1024,
        }
    }
}

impl FetchConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Global configuration loaded from `~/.config/fileguard/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileguardConfig {
    /// Where the trusted manifest is published. The CLI `--url` flag overrides it.
    #[serde(default)]
    pub manifest_url: Option<String>,
    /// Digest algorithm the manifest was generated with.
    #[serde(default)]
    pub algorithm: HashAlgorithm,
    /// Files hashed at once during verification (1 = sequential).
    #[serde(default = "default_max_concurrent_checks")]
    pub max_concurrent_checks: usize,
    /// Optional fetch tuning; if missing, built-in defaults are used.
    #[serde(default)]
    pub fetch: Option<FetchConfig>,
}

fn default_max_concurrent_checks() -> usize {
    4
}

impl Default for FileguardConfig {
    fn default() -> Self {
        Self {
            manifest_url: None,
            algorithm: HashAlgorithm::default(),
            max_concurrent_checks: default_max_concurrent_checks(),
            fetch: None,
        }
    }
}

impl FileguardConfig {
    pub fn fetch_config(&self) -> FetchConfig {
        self.fetch.clone().unwrap_or_default()
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("fileguard")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<FileguardConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = FileguardConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: FileguardConfig = toml::from_str(&data)?;
    Ok(cfg)
}
