//! CLI command handlers. Each command is in its own file.

mod check;
mod completions;
mod hash;
mod verify;

pub use check::run_check;
pub use completions::run_completions;
pub use hash::run_hash;
pub use verify::run_verify;

use anyhow::Result;
use fileguard_core::config::FileguardConfig;
use fileguard_core::CheckOptions;
use std::path::PathBuf;

use super::VerifyArgs;

/// Resolve root dir and check options from flags, falling back to config.
pub(crate) fn resolve(
    cfg: &FileguardConfig,
    args: &VerifyArgs,
) -> Result<(PathBuf, CheckOptions)> {
    let root = match &args.root {
        Some(r) => r.clone(),
        None => std::env::current_dir()?,
    };
    let mut opts = CheckOptions::from(cfg);
    if let Some(jobs) = args.jobs {
        opts.max_concurrent = jobs;
    }
    Ok((root, opts))
}
