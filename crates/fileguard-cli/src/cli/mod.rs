//! CLI for fileguard.

mod commands;
mod present;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use fileguard_core::config;
use fileguard_core::HashAlgorithm;
use std::path::PathBuf;

use commands::{run_check, run_completions, run_hash, run_verify};

/// Exit code when the run completed but at least one file failed verification.
pub const EXIT_INTEGRITY_FAILED: i32 = 2;

/// Top-level CLI for fileguard.
#[derive(Debug, Parser)]
#[command(name = "fileguard")]
#[command(
    about = "fileguard: verify installed files against a published hash manifest",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

/// Options shared by the commands that produce a verification report.
#[derive(Debug, Clone, clap::Args)]
pub struct VerifyArgs {
    /// Install root the manifest names are relative to (default: current directory).
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,
    /// Hash up to N files concurrently (default from config).
    #[arg(long, value_name = "N")]
    pub jobs: Option<usize>,
    /// Print the report as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch the manifest over HTTP(S) and verify the install root against it.
    Check {
        /// Manifest URL (overrides `manifest_url` in config.toml).
        #[arg(long)]
        url: Option<String>,
        #[command(flatten)]
        args: VerifyArgs,
    },

    /// Verify the install root against a manifest file on disk.
    Verify {
        /// Path to the manifest JSON.
        manifest: PathBuf,
        #[command(flatten)]
        args: VerifyArgs,
    },

    /// Print the digest of a file in manifest encoding.
    Hash {
        /// Path to the file.
        path: PathBuf,
        /// blake2b512 or sha256 (default from config).
        #[arg(long)]
        algorithm: Option<HashAlgorithm>,
    },

    /// Print shell completions to stdout.
    Completions {
        shell: Shell,
    },
}

impl CliCommand {
    /// Returns the process exit code.
    pub async fn run_from_args() -> Result<i32> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Check { url, args } => run_check(&cfg, url, &args).await,
            CliCommand::Verify { manifest, args } => run_verify(&cfg, &manifest, &args).await,
            CliCommand::Hash { path, algorithm } => {
                run_hash(&path, algorithm.unwrap_or(cfg.algorithm))?;
                Ok(0)
            }
            CliCommand::Completions { shell } => {
                run_completions(shell);
                Ok(0)
            }
        }
    }
}

#[cfg(test)]
mod tests;
