// Tests for subdomain extraction

use ghsubs_core::extract::{SubdomainExtractor, subdomain_pattern};
use std::fs;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, content: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

// ============================================================================
// Pattern Tests
// ============================================================================

#[test]
fn test_pattern_matches_expected_forms() {
    let pattern = subdomain_pattern("example.com").unwrap();
    assert!(pattern.is_match("sub.example.com"));
    assert!(pattern.is_match("a.b.example.com"));
    assert!(pattern.is_match("example.com"));
}

#[test]
fn test_pattern_rejects_embedded_domain() {
    let pattern = subdomain_pattern("example.com").unwrap();
    assert!(!pattern.is_match("otherexample.com"));
    assert!(!pattern.is_match("example.comx.com"));
}

#[test]
fn test_pattern_escapes_regex_metacharacters() {
    let pattern = subdomain_pattern("ex+ample.com").unwrap();
    assert!(pattern.is_match("www.ex+ample.com"));
    assert!(!pattern.is_match("www.exxample.com"));
}

// ============================================================================
// File Extraction Tests
// ============================================================================

#[test]
fn test_extract_sorted_lowercase_unique() {
    let dir = TempDir::new().unwrap();
    let a = write(&dir, "a.yml", b"host: API.example.com\nalt: www.example.com\n");
    let b = write(&dir, "b.json", br#"{"h":"api.example.com","c":"cdn.example.com"}"#);

    let extractor = SubdomainExtractor::new("example.com").unwrap();
    let extraction = extractor.extract(&[a, b]);

    assert_eq!(
        extraction.subdomains,
        vec!["api.example.com", "cdn.example.com", "www.example.com"]
    );
    assert_eq!(extraction.files_scanned, 2);
    assert!(extraction.failures.is_empty());
}

#[test]
fn test_extract_decodes_before_matching() {
    let dir = TempDir::new().unwrap();
    let file = write(
        &dir,
        "page.html",
        br#"<a href="https://docs.example.com">x</a> foo%2Eexample.com &amp;bar.example.com"#,
    );

    let extractor = SubdomainExtractor::new("example.com").unwrap();
    let extraction = extractor.extract(&[file]);

    assert_eq!(
        extraction.subdomains,
        vec!["bar.example.com", "docs.example.com", "foo.example.com"]
    );
}

#[test]
fn test_read_failure_does_not_stop_extraction() {
    let dir = TempDir::new().unwrap();
    let good = write(&dir, "good.txt", b"vpn.example.com");
    let missing = dir.path().join("missing.txt");
    let directory = dir.path().to_path_buf();

    let extractor = SubdomainExtractor::new("example.com").unwrap();
    let extraction = extractor.extract(&[missing, directory, good]);

    assert_eq!(extraction.subdomains, vec!["vpn.example.com"]);
    assert_eq!(extraction.files_scanned, 1);
    assert_eq!(extraction.failures.len(), 2);
}

#[test]
fn test_extract_ignores_invalid_utf8() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "blob.bin", b"\x00\xff\xfeftp.example.com\x80");

    let extractor = SubdomainExtractor::new("example.com").unwrap();
    let extraction = extractor.extract(&[file]);

    assert_eq!(extraction.subdomains, vec!["ftp.example.com"]);
}

#[test]
fn test_extract_dir_walks_recursively() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("nested/deeper")).unwrap();
    fs::write(dir.path().join("top.txt"), "one.example.com").unwrap();
    fs::write(dir.path().join("nested/deeper/low.txt"), "two.example.com").unwrap();

    let extractor = SubdomainExtractor::new("example.com").unwrap();
    let extraction = extractor.extract_dir(dir.path());

    assert_eq!(extraction.subdomains, vec!["one.example.com", "two.example.com"]);
    assert_eq!(extraction.files_scanned, 2);
}

#[test]
fn test_extraction_is_idempotent() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "z.example.com a.example.com").unwrap();
    fs::write(dir.path().join("b.txt"), "M.example.com").unwrap();

    let extractor = SubdomainExtractor::new("example.com").unwrap();
    let first = extractor.extract_dir(dir.path());
    let second = extractor.extract_dir(dir.path());

    assert_eq!(first.subdomains, second.subdomains);
    assert_eq!(
        first.subdomains,
        vec!["a.example.com", "m.example.com", "z.example.com"]
    );
}
