use chromiumoxide::error::CdpError;
use rate_scout_core::PageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("CDP error: {0}")]
    Cdp(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<CdpError> for Error {
    fn from(err: CdpError) -> Self {
        match err {
            CdpError::Timeout => Error::Timeout("CDP request timed out".to_string()),
            other => Error::Cdp(other.to_string()),
        }
    }
}

impl From<Error> for PageError {
    fn from(err: Error) -> Self {
        match err {
            Error::Timeout(msg) => PageError::Timeout(msg),
            other => PageError::Driver(other.to_string()),
        }
    }
}

impl From<Error> for rate_scout_core::Error {
    fn from(err: Error) -> Self {
        rate_scout_core::Error::Page(err.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
