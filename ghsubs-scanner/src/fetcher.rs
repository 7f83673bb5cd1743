use crate::config::ScannerConfig;
use crate::error::{Result, ScanError};
use crate::result::{FetchResult, FetchStatus, format_megabytes};
use reqwest::header::{CONTENT_LENGTH, HeaderMap};
use reqwest::{Client, StatusCode};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use url::Url;

/// Progress notifications emitted while a file is being fetched.
#[derive(Debug, Clone)]
pub enum FetchEvent {
    Checking {
        index: usize,
        total: usize,
        raw_url: String,
    },
    Downloading {
        index: usize,
        total: usize,
        raw_url: String,
    },
    Finished(FetchResult),
}

pub type FetchCallback = Arc<dyn Fn(FetchEvent) + Send + Sync>;

/// Downloads a single search hit into the files directory.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    config: ScannerConfig,
    files_dir: PathBuf,
    callback: Option<FetchCallback>,
}

impl Fetcher {
    pub fn new(config: ScannerConfig, files_dir: impl Into<PathBuf>) -> Result<Self> {
        config.validate()?;
        let client = config.fetch_client()?;
        Ok(Self {
            client,
            config,
            files_dir: files_dir.into(),
            callback: None,
        })
    }

    pub fn with_callback(mut self, callback: FetchCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn files_dir(&self) -> &Path {
        &self.files_dir
    }

    /// Fetch one URL. Never fails: every error is folded into the result.
    pub async fn fetch(&self, url: &str, index: usize, total: usize) -> FetchResult {
        let mut result = FetchResult::new(url.to_string(), index, total);

        match self.try_fetch(&mut result).await {
            Ok(status) => result.status = status,
            Err(e) => {
                debug!("Failed to download {}: {}", url, e);
                result = result.with_error(e.to_string());
            }
        }

        self.emit(FetchEvent::Finished(result.clone()));
        result
    }

    async fn try_fetch(&self, result: &mut FetchResult) -> Result<FetchStatus> {
        let raw_url = raw_content_url(&result.url, &self.config.view_host, &self.config.raw_host)?;
        let local_path = self.files_dir.join(local_file_name(&result.url)?);
        result.raw_url = Some(raw_url.to_string());

        self.emit(FetchEvent::Checking {
            index: result.index,
            total: result.total,
            raw_url: raw_url.to_string(),
        });

        let head = self.client.head(raw_url.clone()).send().await?;
        let size = declared_size(head.headers());
        result.content_length = Some(size);

        if size > self.config.max_file_size {
            info!("Skipping {} (Size: {})", raw_url, format_megabytes(size));
            return Ok(FetchStatus::Oversized(size));
        }

        self.emit(FetchEvent::Downloading {
            index: result.index,
            total: result.total,
            raw_url: raw_url.to_string(),
        });

        let response = self.client.get(raw_url.clone()).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            debug!("{} answered {}", raw_url, status);
            return Ok(FetchStatus::BadStatus(status.as_u16()));
        }

        let body = response.bytes().await?;
        tokio::fs::write(&local_path, &body).await?;
        debug!("Saved {} bytes to {}", body.len(), local_path.display());

        Ok(FetchStatus::Saved(local_path))
    }

    fn emit(&self, event: FetchEvent) {
        if let Some(ref callback) = self.callback {
            callback(event);
        }
    }
}

/// Rewrite a file view URL into its raw content URL.
///
/// On the view host the path is `/{owner}/{repo}/blob/{ref}/...`: the host is
/// swapped for the raw host and the `blob` segment after the repository is
/// dropped, so `https://github.com/o/r/blob/main/a.txt` becomes
/// `https://raw.githubusercontent.com/o/r/main/a.txt`. Other hosts keep their
/// host and lose their first `blob` segment.
pub fn raw_content_url(url: &str, view_host: &str, raw_host: &str) -> Result<Url> {
    let mut parsed =
        Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;

    let mut segments: Vec<String> = parsed
        .path_segments()
        .map(|segments| segments.map(str::to_string).collect())
        .unwrap_or_default();

    let blob = if parsed.host_str() == Some(view_host) {
        parsed
            .set_host(Some(raw_host))
            .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", raw_host, e)))?;
        segments.get(2).filter(|s| s.as_str() == "blob").map(|_| 2)
    } else {
        segments.iter().position(|s| s == "blob")
    };

    if let Some(pos) = blob {
        segments.remove(pos);
        parsed.set_path(&segments.join("/"));
    }

    Ok(parsed)
}

/// Name of the local copy: the last path segment of the source URL.
pub fn local_file_name(url: &str) -> Result<String> {
    let parsed =
        Url::parse(url).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", url, e)))?;

    parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty() && *name != "." && *name != "..")
        .map(str::to_string)
        .ok_or_else(|| ScanError::InvalidUrl(format!("{} has no file name", url)))
}

/// Size announced in `Content-Length`; missing or garbled headers count as 0.
fn declared_size(headers: &HeaderMap) -> u64 {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}
