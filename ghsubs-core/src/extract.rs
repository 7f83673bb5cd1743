// Hostname harvesting from downloaded files

use crate::decode::decode;
use crate::error::{CoreError, Result};
use regex::{Regex, RegexBuilder};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// A file that could not be read during extraction.
#[derive(Debug, Clone)]
pub struct ReadFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// Lowercased, deduplicated and sorted
    pub subdomains: Vec<String>,
    pub files_scanned: usize,
    pub failures: Vec<ReadFailure>,
}

pub struct SubdomainExtractor {
    domain: String,
    pattern: Regex,
}

impl SubdomainExtractor {
    pub fn new(domain: &str) -> Result<Self> {
        Ok(Self {
            domain: domain.to_string(),
            pattern: subdomain_pattern(domain)?,
        })
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Every hostname in `text` ending in the target domain, as written.
    pub fn find_in<'a>(&'a self, text: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pattern.find_iter(text).map(|m| m.as_str())
    }

    /// Scan every file below `dir` (recursively).
    pub fn extract_dir(&self, dir: &Path) -> Extraction {
        let mut files = Vec::new();
        let mut failures = Vec::new();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            match entry {
                Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
                Ok(_) => {}
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf());
                    warn!("Error walking {}: {}", path.display(), e);
                    failures.push(ReadFailure {
                        path,
                        error: e.to_string(),
                    });
                }
            }
        }

        let mut extraction = self.extract(&files);
        failures.append(&mut extraction.failures);
        extraction.failures = failures;
        extraction
    }

    /// Scan the given files. A file that cannot be read is recorded and
    /// skipped; the rest are still scanned.
    pub fn extract<P: AsRef<Path>>(&self, files: &[P]) -> Extraction {
        let mut found = BTreeSet::new();
        let mut failures = Vec::new();
        let mut files_scanned = 0;

        for path in files {
            let path = path.as_ref();
            match read_lossy(path) {
                Ok(content) => {
                    let content = decode(&content);
                    found.extend(self.find_in(&content).map(str::to_lowercase));
                    files_scanned += 1;
                }
                Err(e) => {
                    debug!("Error reading {}: {}", path.display(), e);
                    failures.push(ReadFailure {
                        path: path.to_path_buf(),
                        error: e.to_string(),
                    });
                }
            }
        }

        debug!(
            "Scanned {} files, {} unique hosts for {}",
            files_scanned,
            found.len(),
            self.domain
        );

        Extraction {
            subdomains: found.into_iter().collect(),
            files_scanned,
            failures,
        }
    }
}

/// Trim a user supplied target domain and reject ones that cannot match.
pub fn normalize_domain(domain: &str) -> Result<String> {
    let domain = domain.trim().trim_end_matches('.');
    if domain.is_empty() || domain.chars().any(char::is_whitespace) {
        return Err(CoreError::InvalidDomain(domain.to_string()));
    }
    Ok(domain.to_string())
}

/// `\b(?:[a-zA-Z0-9-]+\.)*<domain>\b`, case-insensitive.
pub fn subdomain_pattern(domain: &str) -> Result<Regex> {
    let pattern = format!(r"\b(?:[a-zA-Z0-9-]+\.)*{}\b", regex::escape(domain));
    Ok(RegexBuilder::new(&pattern).case_insensitive(true).build()?)
}

/// Read a file as text, dropping any bytes that are not valid UTF-8.
fn read_lossy(path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(path)?;
    let mut text = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(domain: &str, text: &str) -> Vec<String> {
        let extractor = SubdomainExtractor::new(domain).unwrap();
        extractor.find_in(text).map(String::from).collect()
    }

    #[test]
    fn test_pattern_matches_subdomains_and_apex() {
        assert_eq!(matches("example.com", "see sub.example.com"), vec!["sub.example.com"]);
        assert_eq!(matches("example.com", "a.b.example.com;"), vec!["a.b.example.com"]);
        assert_eq!(matches("example.com", "(example.com)"), vec!["example.com"]);
    }

    #[test]
    fn test_pattern_respects_word_boundaries() {
        assert!(matches("example.com", "otherexample.com").is_empty());
        assert!(matches("example.com", "example.comx.com").is_empty());
        assert!(matches("example.com", "example.company").is_empty());
    }

    #[test]
    fn test_pattern_is_case_insensitive() {
        assert_eq!(matches("example.com", "Mail.EXAMPLE.com"), vec!["Mail.EXAMPLE.com"]);
    }

    #[test]
    fn test_domain_dots_are_literal() {
        assert!(matches("example.com", "examplexcom").is_empty());
    }

    #[test]
    fn test_hyphenated_labels() {
        assert_eq!(
            matches("example.com", "https://dev-api-2.eu.example.com/v1"),
            vec!["dev-api-2.eu.example.com"]
        );
    }

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain(" example.com. ").unwrap(), "example.com");
        assert!(normalize_domain("   ").is_err());
        assert!(normalize_domain("exa mple.com").is_err());
    }

    #[test]
    fn test_read_lossy_drops_invalid_bytes() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bin.dat");
        fs::write(&path, b"x\xff\xfey.example.com").unwrap();
        assert_eq!(read_lossy(&path).unwrap(), "xy.example.com");
    }
}
