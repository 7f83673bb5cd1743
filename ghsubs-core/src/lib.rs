pub mod decode;
pub mod error;
pub mod extract;
pub mod links;
pub mod pipeline;
pub mod report;
pub mod scratch;

pub use error::CoreError;
pub use extract::{Extraction, SubdomainExtractor};
pub use links::{LinkSet, LinkStore};
pub use pipeline::{ScanOptions, ScanOutcome, StatusCallback, execute_scan};
pub use scratch::ScratchLayout;

const BANNER: &str = r#"
        _                    _
   __ _| |__  ___ _   _| |__  ___
  / _` | '_ \/ __| | | | '_ \/ __|
 | (_| | | | \__ \ |_| | |_) \__ \
  \__, |_| |_|___/\__,_|_.__/|___/
  |___/
"#;

pub fn print_banner() {
    println!("{}", BANNER);
    println!("  subdomain discovery through public code search\n");
}
