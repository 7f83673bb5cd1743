// End-to-end tests for the search → fetch → extract pipeline

use ghsubs_core::pipeline::{
    ScanOptions, StatusCallback, describe_fetch_failure, execute_scan, extract_stage, load_links,
};
use ghsubs_core::scratch::ScratchLayout;
use ghsubs_scanner::{FetchResult, FetchStatus, ScannerConfig};
use serde_json::json;
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

fn mock_config(server: &MockServer) -> ScannerConfig {
    ScannerConfig {
        api_base: server.uri(),
        view_host: "127.0.0.1".to_string(),
        raw_host: "127.0.0.1".to_string(),
        page_delay: Duration::ZERO,
        ..ScannerConfig::default()
    }
}

fn collecting_status() -> (StatusCallback, Arc<Mutex<Vec<String>>>) {
    let lines = Arc::new(Mutex::new(Vec::new()));
    let lines_clone = lines.clone();
    let callback: StatusCallback = Arc::new(move |line: String| {
        lines_clone.lock().unwrap().push(line);
    });
    (callback, lines)
}

async fn mount_file(server: &MockServer, name: &str, body: &str) {
    let raw_path = format!("/acme/site/main/{}", name);
    Mock::given(method("HEAD"))
        .and(path(raw_path.clone()))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(raw_path))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_scan_writes_sorted_subdomains() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let view = |name: &str| format!("{}/acme/site/blob/main/{}", mock_server.uri(), name);

    Mock::given(method("GET"))
        .and(path("/search/code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "html_url": view("hosts.txt") },
                { "html_url": view("config.json") },
                { "html_url": view("hosts.txt") },
                { "html_url": view("missing.txt") },
            ]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_file(&mock_server, "hosts.txt", "WWW.example.com\nmail.example.com\n").await;
    mount_file(
        &mock_server,
        "config.json",
        r#"{"api":"https:\/\/api.example.com","cdn":"cdn%2Eexample.com","x":"notexample.com"}"#,
    )
    .await;

    Mock::given(method("HEAD"))
        .and(path("/acme/site/main/missing.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/acme/site/main/missing.txt"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let scratch = ScratchLayout::new(dir.path().join("tmp"));
    let output = dir.path().join("out/subs.txt");
    let (status, lines) = collecting_status();

    let options = ScanOptions {
        domain: "example.com".to_string(),
        scratch: scratch.clone(),
        output: Some(output.clone()),
        scanner: mock_config(&mock_server),
        show_progress_bars: false,
    };
    let outcome = execute_scan(options, Some(status)).await.unwrap();

    assert_eq!(
        outcome.subdomains,
        vec![
            "api.example.com",
            "cdn.example.com",
            "mail.example.com",
            "www.example.com"
        ]
    );
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "api.example.com\ncdn.example.com\nmail.example.com\nwww.example.com"
    );

    assert_eq!(outcome.summary.links, 3);
    assert_eq!(outcome.summary.saved, 2);
    assert_eq!(outcome.summary.bad_status, 1);
    assert_eq!(outcome.summary.subdomains, 4);

    let persisted = fs::read_to_string(scratch.links_file()).unwrap();
    assert_eq!(persisted.lines().count(), 3);

    let lines = lines.lock().unwrap();
    assert!(lines.iter().any(|l| l == "[*] Page 1: 4 results"));
    assert!(lines.iter().any(|l| l.starts_with("[+] Saved 4 subdomains to")));
}

#[tokio::test]
async fn test_search_failure_aborts_run() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/search/code"))
        .respond_with(ResponseTemplate::new(500).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let scratch = ScratchLayout::new(dir.path().join("tmp"));
    let options = ScanOptions {
        domain: "example.com".to_string(),
        scratch: scratch.clone(),
        output: None,
        scanner: mock_config(&mock_server),
        show_progress_bars: false,
    };

    assert!(execute_scan(options, None).await.is_err());
    assert!(!scratch.links_file().exists());
}

#[tokio::test]
async fn test_zero_workers_is_rejected_before_search() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(0)
        .mount(&mock_server)
        .await;

    let options = ScanOptions {
        domain: "example.com".to_string(),
        scratch: ScratchLayout::new(dir.path()),
        output: None,
        scanner: mock_config(&mock_server).with_workers(0),
        show_progress_bars: false,
    };

    assert!(execute_scan(options, None).await.is_err());
}

#[test]
fn test_extract_stage_reuses_existing_files() {
    let dir = TempDir::new().unwrap();
    let scratch = ScratchLayout::new(dir.path());
    fs::create_dir_all(scratch.files_dir()).unwrap();
    fs::write(scratch.files_dir().join("a.txt"), "b.example.org a.example.org").unwrap();

    let output = dir.path().join("subs.txt");
    let extraction = extract_stage("example.org", &scratch, Some(output.as_path()), &None).unwrap();

    assert_eq!(extraction.subdomains, vec!["a.example.org", "b.example.org"]);
    assert_eq!(
        fs::read_to_string(output).unwrap(),
        "a.example.org\nb.example.org"
    );
}

#[test]
fn test_extract_stage_without_files_dir() {
    let dir = TempDir::new().unwrap();
    let scratch = ScratchLayout::new(dir.path().join("empty"));
    let output = dir.path().join("subs.txt");

    let extraction = extract_stage("example.org", &scratch, Some(output.as_path()), &None).unwrap();

    assert!(extraction.subdomains.is_empty());
    assert_eq!(fs::read_to_string(output).unwrap(), "");
}

#[test]
fn test_load_links_requires_prior_search() {
    let dir = TempDir::new().unwrap();
    let scratch = ScratchLayout::new(dir.path());
    assert!(load_links(&scratch).is_err());

    scratch
        .link_store()
        .persist(vec!["https://github.com/o/r/blob/main/a".to_string()])
        .unwrap();
    assert_eq!(load_links(&scratch).unwrap().len(), 1);
}

#[test]
fn test_describe_fetch_failure() {
    let mut result = FetchResult::new("https://github.com/o/r/blob/main/big.bin".to_string(), 1, 1);
    result.raw_url = Some("https://raw.githubusercontent.com/o/r/main/big.bin".to_string());

    result.status = FetchStatus::Oversized(200 * 1024 * 1024);
    assert_eq!(
        describe_fetch_failure(&result).unwrap(),
        "[-] Skipping https://raw.githubusercontent.com/o/r/main/big.bin (Size: 200.00 MB)"
    );

    result.status = FetchStatus::Saved("tmp/files/big.bin".into());
    assert!(describe_fetch_failure(&result).is_none());
}
