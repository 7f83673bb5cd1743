use crate::error::{Result, ScanError};
use reqwest::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.github.com";
pub const DEFAULT_VIEW_HOST: &str = "github.com";
pub const DEFAULT_RAW_HOST: &str = "raw.githubusercontent.com";
pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const DEFAULT_WORKERS: usize = 2;
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Settings shared by the search client and the downloader.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Personal access token sent as `Authorization: token ...`
    pub token: Option<String>,
    pub api_base: String,
    /// Host of the rendered file view (search results point here)
    pub view_host: String,
    /// Host serving the raw file bodies
    pub raw_host: String,
    pub page_size: usize,
    /// Pause between search pages
    pub page_delay: Duration,
    /// Timeout applied to both the size probe and the download
    pub fetch_timeout: Duration,
    pub max_file_size: u64,
    pub workers: usize,
    pub user_agent: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            token: None,
            api_base: DEFAULT_API_BASE.to_string(),
            view_host: DEFAULT_VIEW_HOST.to_string(),
            raw_host: DEFAULT_RAW_HOST.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            page_delay: Duration::from_millis(1500),
            fetch_timeout: Duration::from_secs(10),
            max_file_size: MAX_FILE_SIZE,
            workers: DEFAULT_WORKERS,
            user_agent: format!("ghsubs/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ScannerConfig {
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(ScanError::Config("worker count must be at least 1".into()));
        }
        if self.page_size == 0 {
            return Err(ScanError::Config("page size must be at least 1".into()));
        }
        url::Url::parse(&self.api_base)
            .map_err(|e| ScanError::InvalidUrl(format!("{}: {}", self.api_base, e)))?;
        Ok(())
    }

    /// Client for the search API. Search calls carry no request timeout.
    pub(crate) fn search_client(&self) -> Result<Client> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        if let Some(ref token) = self.token {
            let mut value = HeaderValue::from_str(&format!("token {}", token))
                .map_err(|e| ScanError::Config(format!("token is not a valid header value: {}", e)))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .user_agent(self.user_agent.as_str())
            .default_headers(headers)
            .build()?;
        Ok(client)
    }

    /// Client for raw file probes and downloads. Compression stays off so
    /// `Content-Length` describes the stored bytes and bodies land verbatim.
    pub(crate) fn fetch_client(&self) -> Result<Client> {
        let client = Client::builder()
            .user_agent(self.user_agent.as_str())
            .timeout(self.fetch_timeout)
            .no_gzip()
            .pool_max_idle_per_host(self.workers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;
        Ok(client)
    }
}
