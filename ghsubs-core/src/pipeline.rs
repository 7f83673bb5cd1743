// Search → fetch → extract orchestration

use crate::error::{CoreError, Result};
use crate::extract::{Extraction, SubdomainExtractor, normalize_domain};
use crate::links::LinkSet;
use crate::report::{RunSummary, write_subdomains};
use crate::scratch::ScratchLayout;
use ghsubs_scanner::result::format_megabytes;
use ghsubs_scanner::{
    DownloadCoordinator, FetchCallback, FetchEvent, FetchResult, FetchStatus, Fetcher,
    ScannerConfig, SearchClient,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Receives human readable status lines (`[*] ...`, `[+] ...`, `[-] ...`).
pub type StatusCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Options for a full run
pub struct ScanOptions {
    pub domain: String,
    pub scratch: ScratchLayout,
    pub output: Option<PathBuf>,
    pub scanner: ScannerConfig,
    pub show_progress_bars: bool,
}

#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub subdomains: Vec<String>,
    pub summary: RunSummary,
}

fn emit(status: &Option<StatusCallback>, line: String) {
    if let Some(callback) = status {
        callback(line);
    }
}

/// Run all three stages in order. Only search errors (and unusable
/// configuration) abort the run.
pub async fn execute_scan(
    options: ScanOptions,
    status: Option<StatusCallback>,
) -> Result<ScanOutcome> {
    let ScanOptions {
        domain,
        scratch,
        output,
        scanner,
        show_progress_bars,
    } = options;

    let domain = normalize_domain(&domain)?;
    scanner.validate()?;

    let mut summary = RunSummary::new(&domain);

    let links = search_stage(&domain, &scanner, &scratch, &status).await?;
    summary.links = links.len();

    let downloads = fetch_stage(&links, &scanner, &scratch, show_progress_bars, &status).await?;
    summary.record_downloads(&downloads);

    let extraction = extract_stage(&domain, &scratch, output.as_deref(), &status)?;
    summary.files_scanned = extraction.files_scanned;
    summary.read_failures = extraction.failures.len();
    summary.subdomains = extraction.subdomains.len();

    info!("Run for {} complete: {:?}", domain, summary);
    Ok(ScanOutcome {
        subdomains: extraction.subdomains,
        summary,
    })
}

/// Search for `domain` and persist the deduplicated hits to the link file.
pub async fn search_stage(
    domain: &str,
    config: &ScannerConfig,
    scratch: &ScratchLayout,
    status: &Option<StatusCallback>,
) -> Result<LinkSet> {
    emit(status, format!("[*] Searching GitHub for '{}'...", domain));

    let page_status = status.clone();
    let client = SearchClient::new(config.clone())?.with_page_callback(Arc::new(
        move |page: u32, count: usize| {
            emit(&page_status, format!("[*] Page {}: {} results", page, count));
        },
    ));

    let hits = client.search(domain).await?;
    let links = scratch.link_store().persist(hits)?;

    emit(
        status,
        format!(
            "[+] {} unique links saved to {}",
            links.len(),
            scratch.links_file().display()
        ),
    );
    Ok(links)
}

/// Load the link file written by an earlier search.
pub fn load_links(scratch: &ScratchLayout) -> Result<LinkSet> {
    let store = scratch.link_store();
    if !store.exists() {
        return Err(CoreError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!(
                "no link file at {}; run a search first",
                store.path().display()
            ),
        )));
    }
    store.load()
}

/// Download every link into the scratch files directory.
pub async fn fetch_stage(
    links: &LinkSet,
    config: &ScannerConfig,
    scratch: &ScratchLayout,
    show_progress_bars: bool,
    status: &Option<StatusCallback>,
) -> Result<Vec<FetchResult>> {
    emit(status, format!("[*] Downloading {} files...", links.len()));

    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new(links.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Some(Arc::new(pb))
    } else {
        None
    };

    let fetcher = Fetcher::new(config.clone(), scratch.files_dir())?
        .with_callback(fetch_callback(progress_bar.clone(), status.clone()));
    let coordinator = DownloadCoordinator::new(fetcher, config.workers)?;
    let results = coordinator.fetch_all(&links.to_vec()).await?;

    if let Some(pb) = progress_bar {
        pb.finish_and_clear();
    }

    let saved = results.iter().filter(|r| r.is_saved()).count();
    emit(
        status,
        format!("[+] Downloaded {} of {} files", saved, results.len()),
    );
    Ok(results)
}

fn fetch_callback(
    progress_bar: Option<Arc<ProgressBar>>,
    status: Option<StatusCallback>,
) -> FetchCallback {
    Arc::new(move |event: FetchEvent| {
        let line = match event {
            FetchEvent::Checking {
                index,
                total,
                raw_url,
            } => match progress_bar {
                Some(ref pb) => {
                    pb.set_message(raw_url);
                    None
                }
                None => Some(format!("[{}/{}] Checking: {}", index, total, raw_url)),
            },
            FetchEvent::Downloading {
                index,
                total,
                raw_url,
            } => match progress_bar {
                Some(_) => None,
                None => Some(format!("[{}/{}] Downloading: {}", index, total, raw_url)),
            },
            FetchEvent::Finished(result) => {
                if let Some(ref pb) = progress_bar {
                    pb.inc(1);
                }
                describe_fetch_failure(&result)
            }
        };

        if let Some(line) = line {
            match progress_bar {
                Some(ref pb) => pb.println(line),
                None => emit(&status, line),
            }
        }
    })
}

/// Status line for a download that did not produce a file.
pub fn describe_fetch_failure(result: &FetchResult) -> Option<String> {
    let target = result.raw_url.as_deref().unwrap_or(&result.url);
    match result.status {
        FetchStatus::Saved(_) => None,
        FetchStatus::Oversized(size) => Some(format!(
            "[-] Skipping {} (Size: {})",
            target,
            format_megabytes(size)
        )),
        FetchStatus::BadStatus(code) => Some(format!("[-] {} answered HTTP {}", target, code)),
        FetchStatus::Failed(ref error) => {
            Some(format!("[-] Failed to download {}: {}", result.url, error))
        }
    }
}

/// Extract subdomains from the files directory and write or print them.
pub fn extract_stage(
    domain: &str,
    scratch: &ScratchLayout,
    output: Option<&std::path::Path>,
    status: &Option<StatusCallback>,
) -> Result<Extraction> {
    emit(status, format!("[*] Extracting subdomains of {}...", domain));

    let extractor = SubdomainExtractor::new(domain)?;
    let files_dir = scratch.files_dir();
    let extraction = if files_dir.is_dir() {
        extractor.extract_dir(&files_dir)
    } else {
        warn!("{} does not exist; nothing to extract", files_dir.display());
        Extraction::default()
    };

    for failure in &extraction.failures {
        let name = failure
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| failure.path.display().to_string());
        emit(status, format!("[-] Error reading {}: {}", name, failure.error));
    }

    let written = write_subdomains(&extraction.subdomains, output)?;
    if let Some(path) = output {
        emit(
            status,
            format!("[+] Saved {} subdomains to {}", written, path.display()),
        );
    }

    Ok(extraction)
}
