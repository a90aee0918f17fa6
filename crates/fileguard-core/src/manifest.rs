//! Manifest document: the trusted list of expected files and their digests.
//!
//! Wire shape (JSON):
//!
//! ```json
//! { "version": "1.4.2", "files": [ { "name": "bin/game", "hash": "ab12..." } ] }
//! ```
//!
//! `files` is required; `version` and any other top-level keys are optional.

use serde::Deserialize;
use std::collections::HashSet;

/// Raw document as it appears on the wire, before validation.
#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    version: Option<serde_json::Value>,
    files: Vec<RawEntry>,
}

/// Publishers write `"version": "1.4.2"` or `"version": 2`; both are kept as text.
fn version_text(value: Option<serde_json::Value>) -> Option<String> {
    match value? {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        other => {
            tracing::debug!("ignoring non-scalar manifest version: {}", other);
            None
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    name: String,
    hash: String,
}

/// Manifest body could not be turned into a [`Manifest`].
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// Not JSON, or JSON of the wrong shape (missing `files`, entry without `name`/`hash`).
    #[error("invalid manifest document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("manifest entry {index} has an empty name")]
    EmptyName { index: usize },
    #[error("manifest entry name must not be empty")]
    BlankName,
    #[error("manifest entry {name:?} has an invalid hash {hash:?} (expected hex digits)")]
    InvalidHash { name: String, hash: String },
}

/// One expected file: path relative to the install root plus its lowercase hex digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    name: String,
    expected_hash: String,
}

impl ManifestEntry {
    /// Validates and normalizes (hash to lowercase) a single entry.
    pub fn new(name: impl Into<String>, expected_hash: &str) -> Result<Self, ManifestError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ManifestError::BlankName);
        }
        let hash = expected_hash.trim();
        if !is_hex_digest(hash) {
            return Err(ManifestError::InvalidHash {
                name,
                hash: expected_hash.to_string(),
            });
        }
        Ok(Self {
            name,
            expected_hash: hash.to_ascii_lowercase(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expected_hash(&self) -> &str {
        &self.expected_hash
    }
}

fn is_hex_digest(s: &str) -> bool {
    !s.is_empty() && s.len() % 2 == 0 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Ordered, immutable list of expected files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    version: Option<String>,
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    pub fn from_entries(entries: Vec<ManifestEntry>) -> Self {
        Self {
            version: None,
            entries,
        }
    }

    /// Parse and validate a manifest body.
    ///
    /// Duplicate names are accepted (each occurrence is checked on its own) but logged.
    pub fn from_json_slice(body: &[u8]) -> Result<Self, ManifestError> {
        let raw: RawManifest = serde_json::from_slice(body)?;
        let mut entries = Vec::with_capacity(raw.files.len());
        let mut seen = HashSet::new();
        for (index, file) in raw.files.into_iter().enumerate() {
            if file.name.is_empty() {
                return Err(ManifestError::EmptyName { index });
            }
            if !seen.insert(file.name.clone()) {
                tracing::warn!("manifest lists {:?} more than once", file.name);
            }
            entries.push(ManifestEntry::new(file.name, &file.hash)?);
        }
        Ok(Self {
            version: version_text(raw.version),
            entries,
        })
    }

    /// `version` field of the document, if it carried one.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<ManifestEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
