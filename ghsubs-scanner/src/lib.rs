pub mod config;
pub mod coordinator;
pub mod error;
pub mod fetcher;
pub mod result;
pub mod search;

pub use config::ScannerConfig;
pub use coordinator::DownloadCoordinator;
pub use error::ScanError;
pub use fetcher::{FetchCallback, FetchEvent, Fetcher};
pub use result::{FetchResult, FetchStatus};
pub use search::{PageCallback, SearchClient};
