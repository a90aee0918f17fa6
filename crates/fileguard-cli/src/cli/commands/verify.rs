//! Verify command: check the install root against a manifest stored on disk.

use anyhow::{Context, Result};
use fileguard_core::config::FileguardConfig;
use fileguard_core::{verify_concurrent, Manifest};
use std::path::Path;

use crate::cli::present;
use crate::cli::VerifyArgs;
use super::resolve;

pub async fn run_verify(
    cfg: &FileguardConfig,
    manifest_path: &Path,
    args: &VerifyArgs,
) -> Result<i32> {
    let body = std::fs::read(manifest_path)
        .with_context(|| format!("read {}", manifest_path.display()))?;
    let manifest = Manifest::from_json_slice(&body)
        .with_context(|| format!("parse {}", manifest_path.display()))?;
    let (root, opts) = resolve(cfg, args)?;
    let report = verify_concurrent(manifest, &root, opts.algorithm, opts.max_concurrent).await;
    present::print_report(&report, args.json)
}
