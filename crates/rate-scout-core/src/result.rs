use serde::{Deserialize, Serialize};

/// Message recorded when navigation or the post wait runs out of time.
pub const TIMEOUT_MESSAGE: &str =
    "Timeout loading page or finding content. Page might be too slow or structure changed.";

/// Message recorded when the page rendered no post containers.
pub const NO_POSTS_MESSAGE: &str = "No posts found on page.";

/// Outcome of scraping one target.
///
/// `error` is set whenever extraction did not fully succeed. `latest_post_text`
/// and `timestamp` are absent when no post was found, independently of `error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeResult {
    pub url: String,
    pub title: Option<String>,
    pub latest_post_text: Option<String>,
    pub timestamp: Option<String>,
    pub error: Option<String>,
}

impl ScrapeResult {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            latest_post_text: None,
            timestamp: None,
            error: None,
        }
    }

    /// A result carrying nothing but the url and an error.
    pub fn failed(url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(url)
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Post text usable by the ranking collaborator.
    pub fn post_text(&self) -> Option<&str> {
        self.latest_post_text.as_deref()
    }
}

/// One result per input target, in input order.
pub type BatchResult = Vec<ScrapeResult>;

/// What a batch run reports back to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub results: BatchResult,
    /// Rate label from the ranking collaborator; `None` when no target produced post text.
    pub selected_rate: Option<String>,
}

impl BatchReport {
    pub fn summary(&self) -> BatchSummary {
        BatchSummary::from_results(&self.results)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub with_posts: usize,
}

impl BatchSummary {
    pub fn from_results(results: &[ScrapeResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.is_success()).count();
        let with_posts = results
            .iter()
            .filter(|r| r.latest_post_text.is_some())
            .count();

        Self {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            with_posts,
        }
    }
}
