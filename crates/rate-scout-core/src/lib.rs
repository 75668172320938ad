pub mod cache;
pub mod config;
pub mod driver;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod rank;
pub mod result;
pub mod retry;
pub mod target;

pub use cache::{ExchangeCache, LatestExchangeInfo};
pub use config::ScrapeConfig;
pub use driver::{BrowserDriver, BrowserSession, ElementHandle, PageHandle};
pub use error::{Error, PageError, Result};
pub use extract::PageExtractor;
pub use pipeline::Pipeline;
pub use rank::{PatternRanker, PostData, PostsByUrl, Ranker};
pub use result::{BatchReport, BatchResult, BatchSummary, ScrapeResult};
pub use retry::RetryPolicy;
pub use target::ScrapeTarget;
