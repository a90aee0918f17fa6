//! Entry point composing manifest fetch and verification.

use std::path::Path;

use crate::config::{FetchConfig, FileguardConfig};
use crate::digest::HashAlgorithm;
use crate::fetch::{fetch_manifest, FetchError};
use crate::report::VerificationReport;
use crate::verify::verify_concurrent;

/// Knobs for one [`check_integrity`] run.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub algorithm: HashAlgorithm,
    /// Files hashed at once (0 and 1 both mean sequential).
    pub max_concurrent: usize,
    pub fetch: FetchConfig,
}

impl From<&FileguardConfig> for CheckOptions {
    fn from(cfg: &FileguardConfig) -> Self {
        Self {
            algorithm: cfg.algorithm,
            max_concurrent: cfg.max_concurrent_checks,
            fetch: cfg.fetch_config(),
        }
    }
}

/// Fetch the manifest at `manifest_url`, then verify every entry under `root_dir`.
///
/// Fetch failures abort with a [`FetchError`]; per-file problems are recorded in
/// the returned report.
pub async fn check_integrity(
    manifest_url: &str,
    root_dir: &Path,
    opts: &CheckOptions,
) -> Result<VerificationReport, FetchError> {
    let url = manifest_url.to_string();
    let fetch_cfg = opts.fetch.clone();
    let manifest = tokio::task::spawn_blocking(move || fetch_manifest(&url, &fetch_cfg))
        .await
        .map_err(|e| FetchError::Network {
            url: manifest_url.to_string(),
            reason: format!("fetch task failed: {}", e),
        })??;
    tracing::debug!(
        "verifying {} files under {}",
        manifest.len(),
        root_dir.display()
    );
    Ok(verify_concurrent(manifest, root_dir, opts.algorithm, opts.max_concurrent).await)
}
