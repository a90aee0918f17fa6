//! Verification report: per-file outcomes in manifest order.
//!
//! Pure data. Presentation (dialogs, log lines, exit codes) belongs to the caller.

use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::fmt;

/// Outcome of checking one manifest entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Match,
    Mismatch,
    /// Missing, unopenable, a directory, or a name that escapes the root.
    Unreadable,
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CheckStatus::Match => "ok",
            CheckStatus::Mismatch => "mismatch",
            CheckStatus::Unreadable => "unreadable",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileCheckResult {
    pub name: String,
    pub expected_hash: String,
    /// `None` when the file could not be read.
    pub actual_hash: Option<String>,
    pub status: CheckStatus,
}

impl FileCheckResult {
    pub fn unreadable(name: &str, expected_hash: &str) -> Self {
        Self {
            name: name.to_string(),
            expected_hash: expected_hash.to_string(),
            actual_hash: None,
            status: CheckStatus::Unreadable,
        }
    }

    /// Compares `actual_hash` against the expected one (both lowercase hex).
    pub fn compared(name: &str, expected_hash: &str, actual_hash: String) -> Self {
        let status = if actual_hash.to_ascii_lowercase() == expected_hash {
            CheckStatus::Match
        } else {
            CheckStatus::Mismatch
        };
        Self {
            name: name.to_string(),
            expected_hash: expected_hash.to_string(),
            actual_hash: Some(actual_hash),
            status,
        }
    }

    pub fn is_match(&self) -> bool {
        self.status == CheckStatus::Match
    }
}

/// Counts per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub total: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub unreadable: usize,
}

/// Result of one verification run. The validity verdict is never stored; it is
/// always derived from the entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerificationReport {
    entries: Vec<FileCheckResult>,
}

impl VerificationReport {
    pub fn new(entries: Vec<FileCheckResult>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[FileCheckResult] {
        &self.entries
    }

    /// True iff every entry matched. An empty report is valid.
    pub fn overall_valid(&self) -> bool {
        self.entries.iter().all(FileCheckResult::is_match)
    }

    /// Entries that did not match, in manifest order.
    pub fn failures(&self) -> impl Iterator<Item = &FileCheckResult> {
        self.entries.iter().filter(|e| !e.is_match())
    }

    pub fn summary(&self) -> ReportSummary {
        let mut s = ReportSummary {
            total: self.entries.len(),
            ..ReportSummary::default()
        };
        for e in &self.entries {
            match e.status {
                CheckStatus::Match => s.matched += 1,
                CheckStatus::Mismatch => s.mismatched += 1,
                CheckStatus::Unreadable => s.unreadable += 1,
            }
        }
        s
    }
}

impl Serialize for VerificationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut st = serializer.serialize_struct("VerificationReport", 2)?;
        st.serialize_field("entries", &self.entries)?;
        st.serialize_field("overall_valid", &self.overall_valid())?;
        st.end()
    }
}
