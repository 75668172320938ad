use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid scrape target '{input}': {reason}")]
    InvalidTarget { input: String, reason: String },

    /// The browser could not be started at all; no target can be processed.
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error(transparent)]
    Page(#[from] PageError),

    #[error("Ranking failed: {0}")]
    Ranking(String),
}

/// Faults raised by a page or element handle.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// A bounded wait (navigation, selector) ran out of time.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Anything else the browser reported: crashes, disconnects, protocol errors.
    #[error("{0}")]
    Driver(String),
}

pub type Result<T> = std::result::Result<T, Error>;
