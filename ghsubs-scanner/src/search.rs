use crate::config::ScannerConfig;
use crate::error::Result;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Called after each page with the page number and how many items it held.
pub type PageCallback = Arc<dyn Fn(u32, usize) + Send + Sync>;

#[derive(Debug, Deserialize)]
struct SearchPage {
    items: Option<Vec<SearchItem>>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    html_url: String,
}

pub struct SearchClient {
    client: Client,
    config: ScannerConfig,
    page_callback: Option<PageCallback>,
}

impl SearchClient {
    pub fn new(config: ScannerConfig) -> Result<Self> {
        config.validate()?;
        let client = config.search_client()?;
        Ok(Self {
            client,
            config,
            page_callback: None,
        })
    }

    pub fn with_page_callback(mut self, callback: PageCallback) -> Self {
        self.page_callback = Some(callback);
        self
    }

    /// Collect the `html_url` of every code search hit for `domain`.
    ///
    /// Pages are requested in creation order until one comes back empty,
    /// short, or without an `items` field. Any transport or JSON error aborts
    /// the whole search.
    pub async fn search(&self, domain: &str) -> Result<Vec<String>> {
        info!("Searching code for '{}'", domain);

        let mut links = Vec::new();
        let mut page: u32 = 1;

        loop {
            let url = self.page_url(domain, page);
            debug!("GET {}", url);

            let response = self.client.get(&url).send().await?;
            let status = response.status();
            let body = response.bytes().await?;
            let parsed: SearchPage = serde_json::from_slice(&body)?;

            let items = match parsed.items {
                Some(items) if !items.is_empty() => items,
                Some(_) => break,
                None => {
                    if !status.is_success() {
                        warn!(
                            "Search API returned {} on page {}; treating as end of results",
                            status, page
                        );
                    }
                    break;
                }
            };

            let count = items.len();
            links.extend(items.into_iter().map(|item| item.html_url));

            if let Some(ref callback) = self.page_callback {
                callback(page, count);
            }

            if count < self.config.page_size {
                break;
            }

            page += 1;
            tokio::time::sleep(self.config.page_delay).await;
        }

        info!("Search finished after {} page(s), {} hits", page, links.len());
        Ok(links)
    }

    fn page_url(&self, domain: &str, page: u32) -> String {
        format!(
            "{}/search/code?q={}&per_page={}&page={}&sort=created&order=asc",
            self.config.api_base.trim_end_matches('/'),
            urlencoding::encode(domain),
            self.config.page_size,
            page
        )
    }
}

impl std::fmt::Debug for SearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchClient")
            .field("api_base", &self.config.api_base)
            .field("page_size", &self.config.page_size)
            .finish()
    }
}
