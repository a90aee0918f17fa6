//! Check command: fetch the published manifest and verify the install root.

use anyhow::{Context, Result};
use fileguard_core::check_integrity;
use fileguard_core::config::FileguardConfig;

use crate::cli::present;
use crate::cli::VerifyArgs;
use super::resolve;

pub async fn run_check(
    cfg: &FileguardConfig,
    url: Option<String>,
    args: &VerifyArgs,
) -> Result<i32> {
    let url = url
        .or_else(|| cfg.manifest_url.clone())
        .context("no manifest URL: pass --url or set manifest_url in config.toml")?;
    let (root, opts) = resolve(cfg, args)?;
    tracing::info!("checking {} against {}", root.display(), url);
    let report = check_integrity(&url, &root, &opts).await?;
    present::print_report(&report, args.json)
}
