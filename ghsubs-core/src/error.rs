use ghsubs_scanner::ScanError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid domain pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Invalid domain: {0}")]
    InvalidDomain(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
