//! Content digests for installed files.
//!
//! Files are streamed through the hasher in fixed-size chunks so memory use
//! stays bounded regardless of file size; the result is always one digest over
//! the complete byte sequence, encoded as lowercase hex.

use blake2::Blake2b512;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const BUF_SIZE: usize = 64 * 1024;

/// Hash algorithm used for both the manifest and local digests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// BLAKE2b with a 512-bit output (128 hex chars).
    #[default]
    Blake2b512,
    /// SHA-256 (64 hex chars).
    Sha256,
}

impl HashAlgorithm {
    /// Length of the lowercase hex encoding of a digest.
    pub fn hex_len(self) -> usize {
        match self {
            HashAlgorithm::Blake2b512 => 128,
            HashAlgorithm::Sha256 => 64,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            HashAlgorithm::Blake2b512 => "blake2b512",
            HashAlgorithm::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "blake2b512" | "blake2b" | "blake2" => Ok(HashAlgorithm::Blake2b512),
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            other => Err(format!("unknown hash algorithm: {}", other)),
        }
    }
}

/// A file could not be hashed: missing, unopenable, a directory, or a read failed.
///
/// Callers treat every variant of the underlying I/O failure the same way.
#[derive(Debug, thiserror::Error)]
#[error("cannot read {}: {source}", .path.display())]
pub struct DigestError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl DigestError {
    fn new(path: &Path, source: io::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Compute the digest of the file at `path` and return it as lowercase hex.
pub fn digest_file(path: &Path, algorithm: HashAlgorithm) -> Result<String, DigestError> {
    match algorithm {
        HashAlgorithm::Blake2b512 => digest_with::<Blake2b512>(path),
        HashAlgorithm::Sha256 => digest_with::<Sha256>(path),
    }
}

/// Digest of an in-memory buffer, same encoding as [`digest_file`].
pub fn digest_bytes(data: &[u8], algorithm: HashAlgorithm) -> String {
    match algorithm {
        HashAlgorithm::Blake2b512 => hex::encode(Blake2b512::digest(data)),
        HashAlgorithm::Sha256 => hex::encode(Sha256::digest(data)),
    }
}

fn digest_with<D: Digest>(path: &Path) -> Result<String, DigestError> {
    let mut f = File::open(path).map_err(|e| DigestError::new(path, e))?;
    let meta = f.metadata().map_err(|e| DigestError::new(path, e))?;
    if meta.is_dir() {
        return Err(DigestError::new(
            path,
            io::Error::new(io::ErrorKind::Other, "is a directory"),
        ));
    }
    let mut hasher = D::new();
    let mut buf = vec![0u8; BUF_SIZE];
    loop {
        let n = match f.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(DigestError::new(path, e)),
        };
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
