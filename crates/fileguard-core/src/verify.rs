//! Integrity verification: check every manifest entry against the install root.
//!
//! Every entry is checked; a failure on one file never stops the run. The report
//! lists results in manifest order, whether hashing ran sequentially or on a
//! bounded set of blocking tasks.

use std::path::Path;
use std::sync::Arc;

use crate::digest::{digest_file, HashAlgorithm};
use crate::manifest::{Manifest, ManifestEntry};
use crate::path_safety::resolve_entry_path;
use crate::report::{CheckStatus, FileCheckResult, VerificationReport};

/// Check a single entry: resolve, hash, compare.
pub fn check_entry(
    root: &Path,
    entry: &ManifestEntry,
    algorithm: HashAlgorithm,
) -> FileCheckResult {
    let path = match resolve_entry_path(root, entry.name()) {
        Ok(p) => p,
        Err(e) => {
            tracing::warn!("{}: rejected manifest name: {}", entry.name(), e);
            return FileCheckResult::unreadable(entry.name(), entry.expected_hash());
        }
    };
    let result = match digest_file(&path, algorithm) {
        Ok(actual) => FileCheckResult::compared(entry.name(), entry.expected_hash(), actual),
        Err(e) => {
            tracing::warn!("{}: {}", entry.name(), e);
            return FileCheckResult::unreadable(entry.name(), entry.expected_hash());
        }
    };
    match result.status {
        CheckStatus::Mismatch => tracing::warn!(
            "hash mismatch: {} expected {} found {}",
            result.name,
            result.expected_hash,
            result.actual_hash.as_deref().unwrap_or("-")
        ),
        _ => tracing::debug!("{}: ok", result.name),
    }
    result
}

/// Verify all entries sequentially on the current thread.
pub fn verify(manifest: &Manifest, root: &Path, algorithm: HashAlgorithm) -> VerificationReport {
    let entries = manifest
        .entries()
        .iter()
        .map(|entry| check_entry(root, entry, algorithm))
        .collect();
    finish(VerificationReport::new(entries))
}

/// Verify entries with at most `max_concurrent` files hashed at once.
///
/// Hashing runs on tokio's blocking pool. Results are written into a slot per
/// manifest index, so completion order never leaks into the report. Dropping the
/// returned future abandons the batch.
pub async fn verify_concurrent(
    manifest: Manifest,
    root: &Path,
    algorithm: HashAlgorithm,
    max_concurrent: usize,
) -> VerificationReport {
    let root = root.to_path_buf();
    let entries = manifest.into_entries();
    let results = run_bounded(&entries, max_concurrent, move |entry| {
        check_entry(&root, entry, algorithm)
    })
    .await;
    finish(VerificationReport::new(results))
}

/// Runs `job` for each entry on the blocking pool, at most `max_concurrent` at a
/// time, and returns results in entry order. A job that panics leaves its entry
/// `Unreadable`.
async fn run_bounded<F>(
    entries: &[ManifestEntry],
    max_concurrent: usize,
    job: F,
) -> Vec<FileCheckResult>
where
    F: Fn(&ManifestEntry) -> FileCheckResult + Send + Sync + 'static,
{
    let max_concurrent = max_concurrent.max(1);
    let job = Arc::new(job);
    let mut slots: Vec<Option<FileCheckResult>> = vec![None; entries.len()];
    let mut pending = entries.iter().cloned().enumerate();
    let mut join_set = tokio::task::JoinSet::new();

    loop {
        while join_set.len() < max_concurrent {
            let Some((index, entry)) = pending.next() else {
                break;
            };
            let job = Arc::clone(&job);
            join_set.spawn_blocking(move || (index, job(&entry)));
        }

        if join_set.is_empty() {
            break;
        }

        let Some(res) = join_set.join_next().await else {
            break;
        };
        match res {
            Ok((index, result)) => slots[index] = Some(result),
            Err(e) => tracing::error!("hash task failed: {}", e),
        }
    }

    slots
        .into_iter()
        .zip(entries)
        .map(|(slot, entry)| {
            slot.unwrap_or_else(|| FileCheckResult::unreadable(entry.name(), entry.expected_hash()))
        })
        .collect()
}

fn finish(report: VerificationReport) -> VerificationReport {
    let s = report.summary();
    if report.overall_valid() {
        tracing::info!("all {} files intact", s.total);
    } else {
        tracing::warn!(
            "integrity check failed: {} of {} files mismatched, {} unreadable",
            s.mismatched,
            s.total,
            s.unreadable
        );
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digest::digest_bytes;
    use std::fs;

    const ALG: HashAlgorithm = HashAlgorithm::Blake2b512;

    fn entry(name: &str, content: &[u8]) -> ManifestEntry {
        ManifestEntry::new(name, &digest_bytes(content, ALG)).unwrap()
    }

    fn write(root: &Path, name: &str, content: &[u8]) {
        let p = root.join(name);
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(p, content).unwrap();
    }

    #[test]
    fn unchanged_file_matches() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.txt", b"hello");
        let m = Manifest::from_entries(vec![entry("a.txt", b"hello")]);
        let report = verify(&m, dir.path(), ALG);
        assert_eq!(report.entries()[0].status, CheckStatus::Match);
        assert_eq!(report.entries()[0].name, "a.txt");
        assert!(report.overall_valid());
    }

    #[test]
    fn changed_file_reports_true_digest() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.txt", b"tampered");
        let m = Manifest::from_entries(vec![entry("a.txt", b"hello")]);
        let report = verify(&m, dir.path(), ALG);
        let r = &report.entries()[0];
        assert_eq!(r.status, CheckStatus::Mismatch);
        assert_eq!(r.actual_hash.as_deref(), Some(digest_bytes(b"tampered", ALG).as_str()));
        assert!(!report.overall_valid());
    }

    #[test]
    fn missing_file_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let m = Manifest::from_entries(vec![entry("a.txt", b"hello")]);
        let report = verify(&m, dir.path(), ALG);
        let r = &report.entries()[0];
        assert_eq!(r.status, CheckStatus::Unreadable);
        assert!(r.actual_hash.is_none());
        assert!(!report.overall_valid());
    }

    #[test]
    fn directory_entry_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("data")).unwrap();
        let m = Manifest::from_entries(vec![entry("data", b"")]);
        assert_eq!(verify(&m, dir.path(), ALG).entries()[0].status, CheckStatus::Unreadable);
    }

    #[test]
    fn escaping_name_is_unreadable() {
        let outer = tempfile::tempdir().unwrap();
        write(outer.path(), "secret", b"s");
        let root = outer.path().join("install");
        fs::create_dir(&root).unwrap();
        let m = Manifest::from_entries(vec![entry("../secret", b"s")]);
        let report = verify(&m, &root, ALG);
        let r = &report.entries()[0];
        assert_eq!(r.status, CheckStatus::Unreadable);
        assert!(r.actual_hash.is_none());
    }

    #[test]
    fn verdict_with_zero_one_and_many_mismatches() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..5 {
            write(dir.path(), &format!("f{i}"), format!("content {i}").as_bytes());
        }
        let manifest_with = |bad: &[usize]| {
            Manifest::from_entries(
                (0..5)
                    .map(|i| {
                        let content = if bad.contains(&i) {
                            "other".to_string()
                        } else {
                            format!("content {i}")
                        };
                        entry(&format!("f{i}"), content.as_bytes())
                    })
                    .collect(),
            )
        };
        assert!(verify(&manifest_with(&[]), dir.path(), ALG).overall_valid());
        let one = verify(&manifest_with(&[3]), dir.path(), ALG);
        assert!(!one.overall_valid());
        assert_eq!(one.summary().mismatched, 1);
        let many = verify(&manifest_with(&[0, 2, 4]), dir.path(), ALG);
        assert!(!many.overall_valid());
        assert_eq!(many.summary().mismatched, 3);
        assert_eq!(many.summary().matched, 2);
    }

    #[test]
    fn empty_manifest_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let report = verify(&Manifest::default(), dir.path(), ALG);
        assert!(report.entries().is_empty());
        assert!(report.overall_valid());
    }

    #[test]
    fn uppercase_manifest_hash_still_matches() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a", b"x");
        let upper = digest_bytes(b"x", ALG).to_ascii_uppercase();
        let m = Manifest::from_entries(vec![ManifestEntry::new("a", &upper).unwrap()]);
        assert!(verify(&m, dir.path(), ALG).overall_valid());
    }

    #[tokio::test]
    async fn concurrent_preserves_manifest_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut entries = Vec::new();
        for i in 0..40 {
            let name = format!("dir{}/file{i:02}", i % 3);
            // Vary sizes so tasks finish out of order.
            let content = vec![i as u8; (40 - i) * 4096];
            if i % 7 != 0 {
                write(dir.path(), &name, &content);
            }
            let expected = if i % 5 == 0 { vec![0xee] } else { content };
            entries.push(entry(&name, &expected));
        }
        let m = Manifest::from_entries(entries);
        let sequential = verify(&m, dir.path(), ALG);
        let concurrent = verify_concurrent(m.clone(), dir.path(), ALG, 8).await;
        assert_eq!(concurrent, sequential);
        let names: Vec<_> = concurrent.entries().iter().map(|e| e.name.clone()).collect();
        let expected: Vec<_> = m.entries().iter().map(|e| e.name().to_string()).collect();
        assert_eq!(names, expected);
        assert!(!concurrent.overall_valid());
    }

    #[tokio::test]
    async fn panicked_job_leaves_only_its_entry_unreadable() {
        let entries: Vec<_> = ["a", "b", "c"]
            .iter()
            .map(|n| entry(n, n.as_bytes()))
            .collect();
        let results = run_bounded(&entries, 2, |e| {
            if e.name() == "b" {
                panic!("hasher failed on {}", e.name());
            }
            FileCheckResult::compared(e.name(), e.expected_hash(), e.expected_hash().to_string())
        })
        .await;
        let statuses: Vec<_> = results.iter().map(|r| r.status).collect();
        assert_eq!(
            statuses,
            [CheckStatus::Match, CheckStatus::Unreadable, CheckStatus::Match]
        );
        let names: Vec<_> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert!(results[1].actual_hash.is_none());
    }

    #[tokio::test]
    async fn concurrent_with_zero_limit_runs_sequentially() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a", b"a");
        write(dir.path(), "b", b"b");
        let m = Manifest::from_entries(vec![entry("a", b"a"), entry("b", b"b")]);
        let report = verify_concurrent(m, dir.path(), ALG, 0).await;
        assert!(report.overall_valid());
        assert_eq!(report.entries().len(), 2);
    }
}
