//! Hash command: print a file digest in manifest encoding.

use anyhow::Result;
use fileguard_core::{digest_file, HashAlgorithm};
use std::path::Path;

pub fn run_hash(path: &Path, algorithm: HashAlgorithm) -> Result<()> {
    let digest = digest_file(path, algorithm)?;
    println!("{}  {}", digest, path.display());
    Ok(())
}
