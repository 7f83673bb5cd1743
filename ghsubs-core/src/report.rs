// Output of the final subdomain list and the end-of-run summary

use crate::error::Result;
use ghsubs_scanner::{FetchResult, FetchStatus};
use std::fs;
use std::path::Path;

/// Counts gathered across the three stages of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub domain: String,
    pub links: usize,
    pub saved: usize,
    pub oversized: usize,
    pub bad_status: usize,
    pub failed: usize,
    pub files_scanned: usize,
    pub read_failures: usize,
    pub subdomains: usize,
}

impl RunSummary {
    pub fn new(domain: &str) -> Self {
        Self {
            domain: domain.to_string(),
            ..Default::default()
        }
    }

    pub fn record_downloads(&mut self, results: &[FetchResult]) {
        for result in results {
            match result.status {
                FetchStatus::Saved(_) => self.saved += 1,
                FetchStatus::Oversized(_) => self.oversized += 1,
                FetchStatus::BadStatus(_) => self.bad_status += 1,
                FetchStatus::Failed(_) => self.failed += 1,
            }
        }
    }
}

/// Write the subdomains newline-joined to `output`, or print one per line.
///
/// Returns how many entries were emitted.
pub fn write_subdomains(subdomains: &[String], output: Option<&Path>) -> Result<usize> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, subdomains.join("\n"))?;
        }
        None => {
            for sub in subdomains {
                println!("{}", sub);
            }
        }
    }
    Ok(subdomains.len())
}

pub fn generate_run_summary(summary: &RunSummary) -> String {
    let mut report = String::new();

    report.push_str("\n═══════════════════════════════════════════════════════════════════════════════\n");
    report.push_str(&format!("                            RUN SUMMARY: {}\n", summary.domain));
    report.push_str("═══════════════════════════════════════════════════════════════════════════════\n\n");

    report.push_str(&format!("Search hits: {}\n", summary.links));
    report.push_str(&format!("Files downloaded: {}\n", summary.saved));
    if summary.oversized > 0 {
        report.push_str(&format!("Skipped (too large): {}\n", summary.oversized));
    }
    if summary.bad_status > 0 {
        report.push_str(&format!("Skipped (bad status): {}\n", summary.bad_status));
    }
    if summary.failed > 0 {
        report.push_str(&format!("Failed downloads: {}\n", summary.failed));
    }
    report.push_str(&format!("Files scanned: {}\n", summary.files_scanned));
    if summary.read_failures > 0 {
        report.push_str(&format!("Unreadable files: {}\n", summary.read_failures));
    }
    report.push_str(&format!("Unique subdomains: {}\n", summary.subdomains));

    report.push_str("\n═══════════════════════════════════════════════════════════════════════════════\n");

    report
}
