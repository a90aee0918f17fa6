pub mod config;
pub mod logging;

pub mod check;
pub mod digest;
pub mod fetch;
pub mod manifest;
pub mod path_safety;
pub mod report;
pub mod verify;

pub use check::{check_integrity, CheckOptions};
pub use digest::{digest_file, HashAlgorithm};
pub use fetch::{fetch_manifest, FetchError};
pub use manifest::{Manifest, ManifestEntry, ManifestError};
pub use report::{CheckStatus, FileCheckResult, ReportSummary, VerificationReport};
pub use verify::{verify, verify_concurrent};
