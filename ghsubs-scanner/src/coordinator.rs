use crate::error::{Result, ScanError};
use crate::fetcher::Fetcher;
use crate::result::FetchResult;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

/// Runs a [`Fetcher`] over a list of URLs with a fixed number of workers.
pub struct DownloadCoordinator {
    fetcher: Arc<Fetcher>,
    workers: usize,
}

impl DownloadCoordinator {
    pub fn new(fetcher: Fetcher, workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(ScanError::Config("worker count must be at least 1".into()));
        }
        Ok(Self {
            fetcher: Arc::new(fetcher),
            workers,
        })
    }

    /// Attempt every URL exactly once and wait for all attempts to finish.
    ///
    /// Results come back in input order. Individual failures are recorded in
    /// their [`FetchResult`]; only a panicked worker task surfaces as an error,
    /// and then only after every other task has finished.
    pub async fn fetch_all(&self, urls: &[String]) -> Result<Vec<FetchResult>> {
        tokio::fs::create_dir_all(self.fetcher.files_dir()).await?;

        let total = urls.len();
        info!("Downloading {} files with {} workers", total, self.workers);

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = Vec::with_capacity(total);

        for (i, url) in urls.iter().enumerate() {
            let fetcher = self.fetcher.clone();
            let semaphore = semaphore.clone();
            let url = url.clone();

            tasks.push(tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| ScanError::Config(e.to_string()))?;
                Ok::<_, ScanError>(fetcher.fetch(&url, i + 1, total).await)
            }));
        }

        // Join every task before reporting, so no attempt outlives the call
        let mut results = Vec::with_capacity(total);
        let mut first_error = None;
        for task in tasks {
            match task.await.map_err(ScanError::from).and_then(|outcome| outcome) {
                Ok(result) => results.push(result),
                Err(e) => {
                    warn!("Download worker failed: {}", e);
                    if first_error.is_none() {
                        first_error = Some(e);
                    }
                }
            }
        }
        if let Some(e) = first_error {
            return Err(e);
        }

        let saved = results.iter().filter(|r| r.is_saved()).count();
        debug!("{} of {} downloads saved", saved, total);
        Ok(results)
    }
}
