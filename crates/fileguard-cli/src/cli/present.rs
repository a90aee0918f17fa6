//! Turns a verification report into terminal output and an exit code.
//!
//! One line per failing file, then a single summary line.

use anyhow::Result;
use fileguard_core::{CheckStatus, FileCheckResult, VerificationReport};

use super::EXIT_INTEGRITY_FAILED;

pub fn print_report(report: &VerificationReport, json: bool) -> Result<i32> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        for line in render_lines(report) {
            println!("{}", line);
        }
    }
    Ok(exit_code(report))
}

pub fn exit_code(report: &VerificationReport) -> i32 {
    if report.overall_valid() {
        0
    } else {
        EXIT_INTEGRITY_FAILED
    }
}

pub fn render_lines(report: &VerificationReport) -> Vec<String> {
    let mut lines: Vec<String> = report.failures().map(render_failure).collect();
    let s = report.summary();
    if report.overall_valid() {
        lines.push(format!("all {} files intact", s.total));
    } else {
        tracing::error!("integrity check failed for {} files", s.mismatched + s.unreadable);
        lines.push(format!(
            "integrity check failed: {} mismatched, {} unreadable, {} of {} intact",
            s.mismatched, s.unreadable, s.matched, s.total
        ));
    }
    lines
}

fn render_failure(r: &FileCheckResult) -> String {
    match r.status {
        CheckStatus::Mismatch => format!(
            "{:<11} {}  expected {}  found {}",
            "MISMATCH",
            r.name,
            r.expected_hash,
            r.actual_hash.as_deref().unwrap_or("-")
        ),
        CheckStatus::Unreadable => format!("{:<11} {}", "UNREADABLE", r.name),
        CheckStatus::Match => format!("{:<11} {}", "OK", r.name),
    }
}
