use std::path::PathBuf;

/// How a single download attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    Saved(PathBuf),
    /// Declared size was above the configured limit
    Oversized(u64),
    /// The download answered with something other than 200
    BadStatus(u16),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct FetchResult {
    pub url: String,
    pub raw_url: Option<String>,
    pub index: usize,
    pub total: usize,
    pub content_length: Option<u64>,
    pub status: FetchStatus,
}

impl FetchResult {
    pub fn new(url: String, index: usize, total: usize) -> Self {
        Self {
            url,
            raw_url: None,
            index,
            total,
            content_length: None,
            status: FetchStatus::Failed("not attempted".to_string()),
        }
    }

    pub fn with_error(mut self, error: String) -> Self {
        self.status = FetchStatus::Failed(error);
        self
    }

    pub fn path(&self) -> Option<&PathBuf> {
        match self.status {
            FetchStatus::Saved(ref path) => Some(path),
            _ => None,
        }
    }

    pub fn is_saved(&self) -> bool {
        self.path().is_some()
    }
}

/// Format a byte count the way skip notices report it.
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
}
